//! Game rules for tic-tac-toe.
//!
//! Pure functions that evaluate a board according to tic-tac-toe rules.
//! Rules are kept apart from board storage so the search engine and the
//! session share one definition of "finished".

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, winning_line};

use super::outcome::Outcome;
use super::types::Board;

/// Evaluates a board.
///
/// Lines are checked rows first, then columns, then the two diagonals; the
/// first complete line decides the winner. With no complete line a full
/// board is a draw, anything else is still in progress.
pub fn evaluate(board: &Board) -> Outcome {
    if let Some((winner, line)) = winning_line(board) {
        return Outcome::Win { winner, line };
    }
    if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
