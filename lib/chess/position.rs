use crate::chess::{Color, Move, Piece, San, Square};
use derive_more::{DebugCustom, Display, Error};
use shakmaty as sm;
use std::{fmt, str::FromStr};

#[cfg(test)]
use proptest::{prelude::*, sample::Selector};

/// Represents an illegal [`Move`] in a given [`Position`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display(fmt = "move `{}` is illegal in this position", _0)]
pub struct IllegalMove(#[error(not(source))] pub Move);

/// The current position on the chess board.
///
/// This type guarantees that it only holds valid positions.
#[derive(DebugCustom, Default, Clone)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[debug(fmt = "Position(\"{}\")", self)]
pub struct Position(
    #[cfg_attr(test, strategy((0..64, any::<Selector>()).prop_map(|(plies, selector)| {
        let mut chess = sm::Chess::default();
        for _ in 0..plies {
            match selector.try_select(sm::Position::legal_moves(&chess)) {
                Some(m) => sm::Position::play_unchecked(&mut chess, &m),
                None => break,
            }
        }
        chess
    }).no_shrink()))]
    sm::Chess,
);

impl Position {
    /// The side to move.
    pub fn turn(&self) -> Color {
        sm::Position::turn(&self.0).into()
    }

    /// The [`Piece`] standing on a [`Square`], if any.
    pub fn piece_at(&self, s: Square) -> Option<Piece> {
        sm::Position::board(&self.0)
            .piece_at(s.into())
            .map(Into::into)
    }

    /// An iterator over the legal [`Move`]s that can be played in this position.
    ///
    /// Castling is represented as the king moving two squares.
    pub fn moves(&self) -> impl Iterator<Item = Move> {
        sm::Position::legal_moves(&self.0)
            .into_iter()
            .filter_map(|vm| sm::uci::Uci::from_standard(&vm).try_into().ok())
    }

    /// Play a [`Move`] if legal in this position.
    pub fn play(&mut self, m: Move) -> Result<San, IllegalMove> {
        match sm::uci::Uci::from(m).to_move(&self.0) {
            Ok(vm) if sm::Position::is_legal(&self.0, &vm) => {
                Ok(sm::san::SanPlus::from_move_and_play_unchecked(&mut self.0, &vm).into())
            }

            _ => Err(IllegalMove(m)),
        }
    }

    fn fen(&self) -> sm::fen::Fen {
        sm::fen::Fen::from_position(self.0.clone(), sm::EnPassantMode::Legal)
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen()
    }
}

impl Eq for Position {}

/// Prints the [Forsyth–Edwards Notation] of this position.
///
/// [Forsyth–Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fen(), f)
    }
}

/// The reason why parsing [`Position`] failed.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[display(fmt = "failed to parse position; {}")]
pub enum ParsePositionError {
    #[display(fmt = "syntax error in the FEN string")]
    InvalidFen,
    #[display(fmt = "the FEN string describes an illegal position")]
    IllegalPosition,
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fen: sm::fen::Fen = s.parse().map_err(|_| ParsePositionError::InvalidFen)?;

        match fen.into_position::<sm::Chess>(sm::CastlingMode::Standard) {
            Ok(chess) => Ok(Position(chess)),
            Err(_) => Err(ParsePositionError::IllegalPosition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Promotion, Role};
    use test_strategy::proptest;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn default_position_is_the_initial_arrangement() {
        let pos = Position::default();
        assert_eq!(pos.turn(), Color::White);
        assert_eq!(pos.piece_at("e1".parse().unwrap()), Some(Piece(Color::White, Role::King)));
        assert_eq!(pos.piece_at("d8".parse().unwrap()), Some(Piece(Color::Black, Role::Queen)));
        assert_eq!(pos.piece_at("e4".parse().unwrap()), None);
        assert_eq!(pos.moves().count(), 20);
    }

    #[test]
    fn playing_a_move_returns_its_algebraic_notation() {
        let mut pos = Position::default();
        assert_eq!(pos.play(mv("e2e4")).map(|san| san.to_string()), Ok("e4".into()));
        assert_eq!(pos.play(mv("e7e5")).map(|san| san.to_string()), Ok("e5".into()));
        assert_eq!(pos.play(mv("g1f3")).map(|san| san.to_string()), Ok("Nf3".into()));
        assert_eq!(pos.turn(), Color::Black);
    }

    #[test]
    fn castling_is_played_as_a_king_move_of_two_squares() {
        let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        assert!(pos.moves().any(|m| m == mv("e1g1")));
        assert_eq!(pos.play(mv("e1g1")).map(|san| san.to_string()), Ok("O-O".into()));
        assert_eq!(pos.piece_at("f1".parse().unwrap()), Some(Piece(Color::White, Role::Rook)));
    }

    #[test]
    fn promotions_are_listed_once_per_role() {
        let pos: Position = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1".parse().unwrap();
        let promotions: Vec<_> = pos
            .moves()
            .filter(|m| m.whence() == "e7".parse().unwrap())
            .map(|m| m.promotion())
            .collect();

        assert_eq!(promotions.len(), 4);
        assert!(!promotions.contains(&Promotion::None));
    }

    #[proptest]
    fn moves_returns_only_playable_moves(
        #[filter(#pos.moves().count() > 0)] pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves().collect::<Vec<_>>());
        let mut next = pos.clone();
        assert!(next.play(m).is_ok());
        assert_eq!(next.turn(), !pos.turn());
    }

    #[proptest]
    fn playing_illegal_move_fails(
        #[by_ref] pos: Position,
        #[filter(!#pos.moves().any(|n| n == #m))] m: Move,
    ) {
        let mut next = pos.clone();
        assert_eq!(next.play(m), Err(IllegalMove(m)));
        assert_eq!(next, pos);
    }

    #[proptest]
    fn parsing_printed_position_is_an_identity(pos: Position) {
        assert_eq!(pos.to_string().parse(), Ok(pos));
    }

    #[proptest]
    fn parsing_garbage_fails(#[strategy("[^/ ]*")] s: String) {
        assert_eq!(s.parse::<Position>(), Err(ParsePositionError::InvalidFen));
    }
}
