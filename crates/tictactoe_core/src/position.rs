//! Board coordinates.

use super::action::MoveError;
use super::types::Board;
use serde::Serialize;
use tracing::instrument;

/// A validated `(row, col)` address on the 3x3 grid.
///
/// Construction goes through [`Coord::new`], so every `Coord` in circulation
/// is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    row: usize,
    col: usize,
}

impl Coord {
    /// All nine coordinates in row-major order.
    pub const ALL: [Coord; 9] = [
        Coord::at(0, 0),
        Coord::at(0, 1),
        Coord::at(0, 2),
        Coord::at(1, 0),
        Coord::at(1, 1),
        Coord::at(1, 2),
        Coord::at(2, 0),
        Coord::at(2, 1),
        Coord::at(2, 2),
    ];

    const fn at(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Creates a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfRange`] when `row` or `col` is not 0, 1 or 2.
    pub fn new(row: usize, col: usize) -> Result<Self, MoveError> {
        if row < 3 && col < 3 {
            Ok(Self::at(row, col))
        } else {
            Err(MoveError::OutOfRange { row, col })
        }
    }

    /// Row index (0-2).
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index (0-2).
    pub fn col(self) -> usize {
        self.col
    }

    /// Converts to a row-major board index (0-8).
    pub fn index(self) -> usize {
        self.row * 3 + self.col
    }

    /// Filters coordinates by board state, returning only empty cells.
    #[instrument(skip(board))]
    pub fn valid_moves(board: &Board) -> Vec<Coord> {
        board.empty_cells().collect()
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
