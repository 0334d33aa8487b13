use crate::chess::{Color, File, Move, Piece, Rank, Square};
use crate::rules::Rules;
use bitflags::bitflags;
use std::collections::BTreeSet;
use std::fmt::{self, Write};

bitflags! {
    /// How a [`Cell`] should stand out.
    #[derive(Default)]
    pub struct Highlight: u8 {
        const CANDIDATE =   0b00000001;
        const SELECTED =    0b00000010;
        const LAST_MOVE =   0b00000100;
    }
}

/// A square as seen by the player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Cell {
    pub square: Square,
    pub occupant: Option<Piece>,
    pub highlight: Highlight,
}

/// The board laid out from the point of view of one side.
///
/// Cells are stored row by row, starting from the row farthest from the viewer.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct BoardView {
    perspective: Color,
    cells: Vec<Cell>,
}

impl BoardView {
    /// Derives the view of a position.
    pub fn new<R: Rules>(
        rules: &R,
        pos: &R::Position,
        perspective: Color,
        selected: Option<Square>,
        candidates: &BTreeSet<Square>,
        last_move: Option<Move>,
    ) -> Self {
        let cells = (0..64)
            .map(|i| {
                let square = Self::square_at(perspective, i / 8, i % 8);
                let mut highlight = Highlight::empty();

                if candidates.contains(&square) {
                    highlight |= Highlight::CANDIDATE;
                }

                if selected == Some(square) {
                    highlight |= Highlight::SELECTED;
                }

                if let Some(m) = last_move {
                    if m.whence() == square || m.whither() == square {
                        highlight |= Highlight::LAST_MOVE;
                    }
                }

                Cell {
                    square,
                    occupant: rules.piece_at(pos, square),
                    highlight,
                }
            })
            .collect();

        BoardView { perspective, cells }
    }

    /// The [`Square`] displayed at a given row and column.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` are not less than 8.
    pub fn square_at(perspective: Color, row: usize, col: usize) -> Square {
        let (rank, file) = match perspective {
            Color::White => (7 - row, col),
            Color::Black => (row, 7 - col),
        };

        Square(File::ALL[file], Rank::ALL[rank])
    }

    /// The side this board is seen from.
    pub fn perspective(&self) -> Color {
        self.perspective
    }

    /// All 64 cells in display order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cells in rows of 8, in display order.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(8)
    }

    /// The cell showing a [`Square`].
    pub fn cell(&self, s: Square) -> &Cell {
        let i = match self.perspective {
            Color::White => (7 - s.rank().index()) * 8 + s.file().index(),
            Color::Black => s.rank().index() * 8 + 7 - s.file().index(),
        };

        &self.cells[i]
    }
}

/// Draws the board as text.
///
/// Selected squares are bracketed, candidates marked with `*` when empty or `x` when
/// occupied, and the last move's squares are wrapped in parentheses.
impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            write!(f, "{} ", row[0].square.rank())?;

            for cell in row {
                let glyph = match (cell.occupant, cell.highlight.contains(Highlight::CANDIDATE)) {
                    (Some(p), false) => p.glyph(),
                    (Some(_), true) => 'x',
                    (None, true) => '*',
                    (None, false) => '.',
                };

                let (l, r) = if cell.highlight.contains(Highlight::SELECTED) {
                    ('[', ']')
                } else if cell.highlight.contains(Highlight::LAST_MOVE) {
                    ('(', ')')
                } else {
                    (' ', ' ')
                };

                f.write_char(l)?;
                f.write_char(glyph)?;
                f.write_char(r)?;
            }

            f.write_char('\n')?;
        }

        f.write_str("  ")?;
        for cell in &self.cells[56..] {
            write!(f, " {} ", cell.square.file())?;
        }

        Ok(())
    }
}
