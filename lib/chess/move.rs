use crate::chess::{ParsePromotionError, ParseSquareError, Promotion, Square};
use derive_more::{DebugCustom, Display, Error};
use shakmaty as sm;
use std::str::FromStr;

/// A chess move in [pure coordinate notation].
///
/// Printing a move yields its wire token, e.g. `e2e4` or `e7e8q`,
/// and parsing a token yields the move back.
///
/// [pure coordinate notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation#Pure_coordinate_notation
#[derive(DebugCustom, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[cfg_attr(test, filter(#self.0 != #self.1))]
#[debug(fmt = "Move({})", self)]
#[display(fmt = "{}{}{}", _0, _1, _2)]
pub struct Move(pub Square, pub Square, pub Promotion);

impl Move {
    /// The source [`Square`].
    pub fn whence(&self) -> Square {
        self.0
    }

    /// The destination [`Square`].
    pub fn whither(&self) -> Square {
        self.1
    }

    /// The [`Promotion`] specifier.
    pub fn promotion(&self) -> Promotion {
        self.2
    }
}

/// The reason why parsing [`Move`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse move; {}")]
pub enum ParseMoveError {
    #[display(fmt = "invalid origin square")]
    InvalidWhence(ParseSquareError),

    #[display(fmt = "invalid destination square")]
    InvalidWhither(ParseSquareError),

    #[display(fmt = "invalid promotion")]
    InvalidPromotion(ParsePromotionError),
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParseMoveError::*;

        let i = s.char_indices().nth(2).map_or_else(|| s.len(), |(i, _)| i);
        let j = s.char_indices().nth(4).map_or_else(|| s.len(), |(i, _)| i);

        Ok(Move(
            s[..i].parse().map_err(InvalidWhence)?,
            s[i..j].parse().map_err(InvalidWhither)?,
            s[j..].parse().map_err(InvalidPromotion)?,
        ))
    }
}

/// The reason why a [`sm::uci::Uci`] has no equivalent [`Move`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "drops and null moves have no coordinate representation")]
pub struct UnrepresentableMove;

#[doc(hidden)]
impl TryFrom<sm::uci::Uci> for Move {
    type Error = UnrepresentableMove;

    fn try_from(m: sm::uci::Uci) -> Result<Self, Self::Error> {
        match m {
            sm::uci::Uci::Normal {
                from,
                to,
                promotion,
            } => Ok(Move(from.into(), to.into(), promotion.into())),

            _ => Err(UnrepresentableMove),
        }
    }
}

#[doc(hidden)]
impl From<Move> for sm::uci::Uci {
    fn from(m: Move) -> Self {
        sm::uci::Uci::Normal {
            from: m.whence().into(),
            to: m.whither().into(),
            promotion: m.promotion().into(),
        }
    }
}
