use std::fmt::{self, Display};

/// A full move: white's ply and black's reply, if already played.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MovePair<T> {
    /// The 1-based move number.
    pub number: usize,
    /// White's ply.
    pub white: T,
    /// Black's reply, unless the game stopped after white's ply.
    pub black: Option<T>,
}

impl<T: Display> Display for MovePair<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number, self.white)?;

        if let Some(black) = &self.black {
            write!(f, " {}", black)?;
        }

        Ok(())
    }
}

/// Groups a flat list of plies into numbered [`MovePair`]s.
pub fn pairs<T: Clone>(plies: &[T]) -> Vec<MovePair<T>> {
    plies
        .chunks(2)
        .enumerate()
        .map(|(i, c)| MovePair {
            number: i + 1,
            white: c[0].clone(),
            black: c.get(1).cloned(),
        })
        .collect()
}

/// Prints a flat list of plies as a numbered transcript, e.g. `1. e4 e5 2. Nf3`.
#[derive(Debug, Copy, Clone)]
pub struct Transcript<'a, T>(pub &'a [T]);

impl<'a, T: Display + Clone> Display for Transcript<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in pairs(self.0).into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }

            write!(f, "{}", pair)?;
        }

        Ok(())
    }
}
