use derive_more::{DebugCustom, Display};
use shakmaty as sm;

/// A move in [standard algebraic notation], including the check and checkmate suffixes.
///
/// [standard algebraic notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation
#[derive(DebugCustom, Display, Clone, Eq, PartialEq)]
#[debug(fmt = "San({})", self)]
#[display(fmt = "{}", _0)]
pub struct San(sm::san::SanPlus);

#[doc(hidden)]
impl From<sm::san::SanPlus> for San {
    fn from(san: sm::san::SanPlus) -> Self {
        San(san)
    }
}

#[doc(hidden)]
impl From<San> for sm::san::SanPlus {
    fn from(san: San) -> Self {
        san.0
    }
}
