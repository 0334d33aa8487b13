use crate::chess::{File, ParseFileError, ParseRankError, Rank};
use derive_more::{Display, Error, From};
use shakmaty as sm;
use std::str::FromStr;

/// A square on the chess board.
///
/// A square's identity is absolute, it never depends on the side the board is seen from.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{}{}", _0, _1)]
pub struct Square(pub File, pub Rank);

impl Square {
    /// Constructs [`Square`] from a pair of [`File`] and [`Rank`].
    pub fn new(f: File, r: Rank) -> Self {
        Square(f, r)
    }

    /// This square's [`File`].
    pub fn file(&self) -> File {
        self.0
    }

    /// This square's [`Rank`].
    pub fn rank(&self) -> Rank {
        self.1
    }

    /// This square's index in the range (0..=63), counting from `a1` along the files.
    pub fn index(&self) -> usize {
        self.rank().index() * 8 + self.file().index()
    }

    /// Constructs [`Square`] from its index, if in the range (0..=63).
    pub fn from_index(i: usize) -> Option<Self> {
        Some(Square(File::from_index(i % 8)?, Rank::from_index(i / 8)?))
    }

    /// An iterator over all squares ordered by [index][`Square::index`].
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..64).filter_map(Square::from_index).collect::<Vec<_>>().into_iter()
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse square; {}")]
pub enum ParseSquareError {
    #[display(fmt = "invalid file")]
    InvalidFile(ParseFileError),
    #[display(fmt = "invalid rank")]
    InvalidRank(ParseRankError),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(1).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Square(s[..i].parse()?, s[i..].parse()?))
    }
}

#[doc(hidden)]
impl From<sm::Square> for Square {
    fn from(s: sm::Square) -> Self {
        Square(s.file().into(), s.rank().into())
    }
}

#[doc(hidden)]
impl From<Square> for sm::Square {
    fn from(s: Square) -> Self {
        sm::Square::from_coords(s.file().into(), s.rank().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn new_constructs_square_from_pair_of_file_and_rank(sq: Square) {
        assert_eq!(Square::new(sq.file(), sq.rank()), sq);
    }

    #[proptest]
    fn from_index_is_the_inverse_of_index(sq: Square) {
        assert_eq!(Square::from_index(sq.index()), Some(sq));
    }

    #[proptest]
    fn from_index_fails_if_out_of_range(#[strategy(64usize..)] i: usize) {
        assert_eq!(Square::from_index(i), None);
    }

    #[test]
    fn corners_have_the_expected_index() {
        assert_eq!("a1".parse::<Square>().map(|s| s.index()), Ok(0));
        assert_eq!("h1".parse::<Square>().map(|s| s.index()), Ok(7));
        assert_eq!("a8".parse::<Square>().map(|s| s.index()), Ok(56));
        assert_eq!("h8".parse::<Square>().map(|s| s.index()), Ok(63));
    }

    #[test]
    fn iter_returns_all_squares_in_order() {
        let squares: Vec<_> = Square::iter().collect();
        assert_eq!(squares.len(), 64);
        assert!(squares.iter().enumerate().all(|(i, s)| s.index() == i));
    }

    #[proptest]
    fn parsing_printed_square_is_an_identity(sq: Square) {
        assert_eq!(sq.to_string().parse(), Ok(sq));
    }

    #[proptest]
    fn parsing_square_fails_if_file_invalid(
        #[filter(!('a'..='h').contains(&#c))] c: char,
        r: Rank,
    ) {
        assert_eq!(
            [c.to_string(), r.to_string()].concat().parse::<Square>(),
            Err(ParseSquareError::InvalidFile(ParseFileError))
        );
    }

    #[proptest]
    fn parsing_square_fails_if_rank_invalid(
        f: File,
        #[filter(!('1'..='8').contains(&#c))] c: char,
    ) {
        assert_eq!(
            [f.to_string(), c.to_string()].concat().parse::<Square>(),
            Err(ParseSquareError::InvalidRank(ParseRankError))
        );
    }

    #[proptest]
    fn square_has_an_equivalent_shakmaty_representation(sq: Square) {
        assert_eq!(Square::from(sm::Square::from(sq)), sq);
    }
}
