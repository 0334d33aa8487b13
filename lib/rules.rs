use crate::chess::{Color, IllegalMove, Move, Piece, Square};
use std::collections::BTreeSet;
use std::fmt::Debug;

mod standard;

pub use standard::*;

/// Trait for types that implement the rules of a variant of chess.
///
/// Positions are opaque to everything but the rules that produce them.
pub trait Rules {
    /// The representation of a position on the board.
    type Position: Debug + Clone + Eq;

    /// The reason why a serialized position could not be restored.
    type Error;

    /// The starting position.
    fn initial(&self) -> Self::Position;

    /// The side to move.
    fn turn(&self, pos: &Self::Position) -> Color;

    /// The [`Piece`] standing on a [`Square`], if any.
    fn piece_at(&self, pos: &Self::Position, s: Square) -> Option<Piece>;

    /// The legal [`Move`]s of the piece standing on `whence`.
    fn moves(&self, pos: &Self::Position, whence: Square) -> Vec<Move>;

    /// The squares the piece standing on `whence` can legally move to.
    fn candidates(&self, pos: &Self::Position, whence: Square) -> BTreeSet<Square> {
        self.moves(pos, whence)
            .into_iter()
            .map(|m| m.whither())
            .collect()
    }

    /// The position that results from playing a [`Move`] and its algebraic notation.
    fn apply(&self, pos: &Self::Position, m: Move) -> Result<(Self::Position, String), IllegalMove>;

    /// Serializes a position.
    fn serialize(&self, pos: &Self::Position) -> String;

    /// Restores a serialized position.
    fn deserialize(&self, s: &str) -> Result<Self::Position, Self::Error>;
}
