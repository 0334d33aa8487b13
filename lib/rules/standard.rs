use super::Rules;
use crate::chess::*;

/// Standard chess rules.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Standard;

impl Rules for Standard {
    type Position = Position;
    type Error = ParsePositionError;

    fn initial(&self) -> Position {
        Position::default()
    }

    fn turn(&self, pos: &Position) -> Color {
        pos.turn()
    }

    fn piece_at(&self, pos: &Position, s: Square) -> Option<Piece> {
        pos.piece_at(s)
    }

    fn moves(&self, pos: &Position, whence: Square) -> Vec<Move> {
        pos.moves().filter(|m| m.whence() == whence).collect()
    }

    fn apply(&self, pos: &Position, m: Move) -> Result<(Position, String), IllegalMove> {
        let mut next = pos.clone();
        let san = next.play(m)?;
        Ok((next, san.to_string()))
    }

    fn serialize(&self, pos: &Position) -> String {
        pos.to_string()
    }

    fn deserialize(&self, s: &str) -> Result<Position, ParsePositionError> {
        s.parse()
    }
}
