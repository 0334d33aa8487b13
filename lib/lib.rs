/// The remote party that validates moves and plays the opponent.
pub mod authority;
/// Presentation of the board from either side.
pub mod board;
/// Chess domain types.
pub mod chess;
/// Move history grouped by move number.
pub mod history;
/// The rules of chess.
pub mod rules;
/// A game played against the authority.
pub mod session;
