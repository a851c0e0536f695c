//! Move selectors that can play a turn on behalf of the computer.

use super::action::SearchError;
use super::position::Coord;
use super::search;
use super::types::{Board, Mark};
use tracing::instrument;

/// Something that can pick a move for `mark` on a board.
pub trait Strategy {
    /// Picks a move for `mark`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] when the board is
    /// already decided.
    fn choose(&self, board: &Board, mark: Mark) -> Result<Coord, SearchError>;

    /// Returns the strategy's display name.
    fn name(&self) -> &str;
}

/// The unbeatable opponent: exhaustive minimax with alpha-beta pruning.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minimax;

impl Strategy for Minimax {
    fn choose(&self, board: &Board, mark: Mark) -> Result<Coord, SearchError> {
        search::best_move(board, mark)
    }

    fn name(&self) -> &str {
        "minimax"
    }
}

/// Picks the first empty cell in row-major order.
///
/// Deliberately weak; useful as a fixed opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailable;

impl Strategy for FirstAvailable {
    #[instrument(skip(self, board))]
    fn choose(&self, board: &Board, _mark: Mark) -> Result<Coord, SearchError> {
        let outcome = board.evaluate();
        if outcome.is_terminal() {
            return Err(SearchError::PreconditionViolation(outcome));
        }
        board
            .empty_cells()
            .next()
            .ok_or(SearchError::PreconditionViolation(outcome))
    }

    fn name(&self) -> &str {
        "first-available"
    }
}
