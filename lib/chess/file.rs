use derive_more::{Display, Error};
use shakmaty as sm;
use std::{fmt, str::FromStr};

/// A column on the chess board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(u8)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    /// All files ordered from `a` to `h`.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// This file's index in the range (0..=7).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Constructs [`File`] from its index, if in the range (0..=7).
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&char::from(*self), f)
    }
}

impl From<File> for char {
    fn from(f: File) -> char {
        char::from(b'a' + f as u8)
    }
}

/// The reason why parsing [`File`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "expected lower case letter in the range `('a'..='h')`")]
pub struct ParseFileError;

impl TryFrom<char> for File {
    type Error = ParseFileError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'a'..='h' => Ok(File::ALL[c as usize - 'a' as usize]),
            _ => Err(ParseFileError),
        }
    }
}

impl FromStr for File {
    type Err = ParseFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<char>().map_err(|_| ParseFileError)?.try_into()
    }
}

#[doc(hidden)]
impl From<sm::File> for File {
    fn from(f: sm::File) -> Self {
        File::ALL[f as usize]
    }
}

#[doc(hidden)]
impl From<File> for sm::File {
    fn from(f: File) -> Self {
        sm::File::new(f as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn all_files_are_ordered_by_index() {
        for (i, f) in File::ALL.into_iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[proptest]
    fn from_index_constructs_file_by_index(f: File) {
        assert_eq!(File::from_index(f.index()), Some(f));
    }

    #[proptest]
    fn from_index_fails_if_out_of_range(#[strategy(8usize..)] i: usize) {
        assert_eq!(File::from_index(i), None);
    }

    #[proptest]
    fn parsing_printed_file_is_an_identity(f: File) {
        assert_eq!(f.to_string().parse(), Ok(f));
    }

    #[proptest]
    fn parsing_file_fails_for_letters_out_of_range(#[filter(!('a'..='h').contains(&#c))] c: char) {
        assert_eq!(c.to_string().parse::<File>(), Err(ParseFileError));
    }

    #[proptest]
    fn parsing_file_fails_for_strings_of_length_not_one(#[strategy(".{2,}")] s: String) {
        assert_eq!(s.parse::<File>(), Err(ParseFileError));
    }

    #[proptest]
    fn file_has_an_equivalent_shakmaty_representation(f: File) {
        assert_eq!(File::from(sm::File::from(f)), f);
    }
}
