//! Core domain types for tic-tac-toe.

use super::action::MoveError;
use super::outcome::Outcome;
use super::position::Coord;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Mark placed by one side of the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Mark {
    /// Cross (X) always moves first.
    #[strum(to_string = "X")]
    Cross,
    /// Naught (O) moves second.
    #[strum(to_string = "O")]
    Naught,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::Cross => Mark::Naught,
            Mark::Naught => Mark::Cross,
        }
    }
}

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

/// 3x3 tic-tac-toe board.
///
/// Boards are `Copy`, which lets the search engine work on scratch copies
/// without touching a live board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Board {
    /// Cells in row-major order.
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at a validated coordinate.
    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[coord.index()]
    }

    /// Gets the cell at `(row, col)`, rejecting coordinates outside the grid.
    #[instrument(skip(self))]
    pub fn cell_at(&self, row: usize, col: usize) -> Result<Cell, MoveError> {
        Coord::new(row, col).map(|coord| self.get(coord))
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord) == Cell::Empty
    }

    /// Places `mark` at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::IllegalMove`] if the cell is already occupied.
    /// Whether the game is already decided is the caller's concern.
    #[instrument(skip(self))]
    pub fn place(&mut self, coord: Coord, mark: Mark) -> Result<(), MoveError> {
        if !self.is_empty(coord) {
            return Err(MoveError::IllegalMove(coord));
        }
        self.set(coord, Cell::Occupied(mark));
        Ok(())
    }

    /// Overwrites a cell without any legality check.
    pub(crate) fn set(&mut self, coord: Coord, cell: Cell) {
        self.cells[coord.index()] = cell;
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        Coord::ALL.into_iter().filter(|coord| self.is_empty(*coord))
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Cell::Occupied(mark))
            .count()
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != Cell::Empty).count()
    }

    /// Checks if no cell is empty.
    pub fn is_full(&self) -> bool {
        super::rules::is_full(self)
    }

    /// Evaluates the board: rows, then columns, then diagonals.
    pub fn evaluate(&self) -> Outcome {
        super::rules::evaluate(self)
    }

    /// Clears every cell.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; 9];
    }

    /// Returns the cells grouped by row.
    pub fn rows(&self) -> [[Cell; 3]; 3] {
        let mut rows = [[Cell::Empty; 3]; 3];
        for coord in Coord::ALL {
            rows[coord.row()][coord.col()] = self.get(coord);
        }
        rows
    }

    /// Formats the board as a human-readable string.
    ///
    /// Empty cells show their `row,col` address so a player can type it back.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (r, row) in self.rows().iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let symbol = match cell {
                    Cell::Empty => format!("{r},{c}"),
                    Cell::Occupied(mark) => format!(" {mark} "),
                };
                result.push_str(&symbol);
                if c < 2 {
                    result.push('|');
                }
            }
            if r < 2 {
                result.push_str("\n---+---+---\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_rejects_occupied_cell() {
        let mut board = Board::new();
        let center = Coord::new(1, 1).unwrap();
        board.place(center, Mark::Cross).unwrap();

        assert_eq!(
            board.place(center, Mark::Naught),
            Err(MoveError::IllegalMove(center))
        );
        assert_eq!(board.get(center), Cell::Occupied(Mark::Cross));
    }

    #[test]
    fn test_cell_at_out_of_range() {
        let board = Board::new();
        assert_eq!(
            board.cell_at(3, 0),
            Err(MoveError::OutOfRange { row: 3, col: 0 })
        );
        assert_eq!(board.cell_at(2, 2), Ok(Cell::Empty));
    }

    #[test]
    fn test_reset_clears_board() {
        let mut board = Board::new();
        board.place(Coord::new(0, 2).unwrap(), Mark::Naught).unwrap();
        board.reset();
        assert_eq!(board, Board::new());
        assert_eq!(board.empty_cells().count(), 9);
    }

    #[test]
    fn test_display_shows_marks_and_addresses() {
        let mut board = Board::new();
        board.place(Coord::new(0, 0).unwrap(), Mark::Cross).unwrap();
        let text = board.display();
        assert!(text.starts_with(" X |0,1|0,2"));
        assert!(text.ends_with("2,0|2,1|2,2"));
    }
}
