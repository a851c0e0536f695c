//! Draw detection logic for tic-tac-toe.

use super::super::types::{Board, Cell};
use super::win::winning_line;

/// Checks if the board is full (all cells occupied).
pub fn is_full(board: &Board) -> bool {
    board.rows().iter().flatten().all(|cell| *cell != Cell::Empty)
}

/// A full board with no complete line.
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && winning_line(board).is_none()
}
