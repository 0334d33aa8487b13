use crate::chess::{Color, Role};
use derive_more::Display;
use shakmaty as sm;

/// A chess [piece][`Role`] of a certain [`Color`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{}", "self.glyph()")]
pub struct Piece(pub Color, pub Role);

impl Piece {
    /// This piece's [`Color`].
    pub fn color(&self) -> Color {
        self.0
    }

    /// This piece's [`Role`].
    pub fn role(&self) -> Role {
        self.1
    }

    /// The unicode chess symbol for this piece.
    pub fn glyph(&self) -> char {
        use Color::*;
        use Role::*;
        match (self.0, self.1) {
            (White, Pawn) => '♙',
            (White, Knight) => '♘',
            (White, Bishop) => '♗',
            (White, Rook) => '♖',
            (White, Queen) => '♕',
            (White, King) => '♔',
            (Black, Pawn) => '♟',
            (Black, Knight) => '♞',
            (Black, Bishop) => '♝',
            (Black, Rook) => '♜',
            (Black, Queen) => '♛',
            (Black, King) => '♚',
        }
    }

    /// The name of the image asset that depicts this piece.
    pub fn asset(&self) -> &'static str {
        use Color::*;
        use Role::*;
        match (self.0, self.1) {
            (White, Pawn) => "wP",
            (White, Knight) => "wN",
            (White, Bishop) => "wB",
            (White, Rook) => "wR",
            (White, Queen) => "wQ",
            (White, King) => "wK",
            (Black, Pawn) => "bP",
            (Black, Knight) => "bN",
            (Black, Bishop) => "bB",
            (Black, Rook) => "bR",
            (Black, Queen) => "bQ",
            (Black, King) => "bK",
        }
    }
}

#[doc(hidden)]
impl From<sm::Piece> for Piece {
    fn from(p: sm::Piece) -> Self {
        Piece(p.color.into(), p.role.into())
    }
}

#[doc(hidden)]
impl From<Piece> for sm::Piece {
    fn from(p: Piece) -> Self {
        sm::Piece {
            color: p.color().into(),
            role: p.role().into(),
        }
    }
}
