//! Win detection logic for tic-tac-toe.

use super::super::position::Coord;
use super::super::types::{Board, Cell, Mark};

/// Every line that wins the game, in evaluation order.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Finds the first complete line on the board.
///
/// Returns the mark that owns it together with the three coordinates, in the
/// order they appear in [`LINES`].
pub fn winning_line(board: &Board) -> Option<(Mark, [Coord; 3])> {
    for [a, b, c] in LINES {
        let line = [Coord::ALL[a], Coord::ALL[b], Coord::ALL[c]];
        let cell = board.get(line[0]);
        if let Cell::Occupied(mark) = cell
            && cell == board.get(line[1])
            && cell == board.get(line[2])
        {
            return Some((mark, line));
        }
    }

    None
}
