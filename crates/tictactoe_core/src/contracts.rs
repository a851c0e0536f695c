//! Invariants that must hold for every session.
//!
//! Checked after each applied move in debug builds.

use super::session::Session;
use super::types::{Board, Cell, Mark};
use tracing::{instrument, warn};

/// Invariant: Cross moves first, so Cross has as many marks as Naught or one more.
pub struct BoardConsistent;

impl BoardConsistent {
    /// Checks the invariant.
    #[instrument(skip(board))]
    pub fn holds(board: &Board) -> bool {
        let crosses = board.count(Mark::Cross);
        let naughts = board.count(Mark::Naught);

        let valid = crosses == naughts || crosses == naughts + 1;
        if !valid {
            warn!(crosses, naughts, "Board consistency violated");
        }
        valid
    }
}

/// Invariant: history length matches filled cells, and every recorded move is on the board.
pub struct HistoryComplete;

impl HistoryComplete {
    /// Checks the invariant.
    #[instrument(skip(session))]
    pub fn holds(session: &Session) -> bool {
        let board = session.board();
        let filled = board.occupied();
        let history_len = session.history().len();

        let matches_board = session
            .history()
            .iter()
            .all(|mv| board.get(mv.coord) == Cell::Occupied(mv.mark));

        let valid = filled == history_len && matches_board;
        if !valid {
            warn!(filled, history_len, matches_board, "History completeness violated");
        }
        valid
    }
}

/// Invariant: the recorded outcome agrees with a fresh evaluation of the board.
pub struct OutcomeCurrent;

impl OutcomeCurrent {
    /// Checks the invariant.
    #[instrument(skip(session))]
    pub fn holds(session: &Session) -> bool {
        let valid = *session.outcome() == session.board().evaluate();
        if !valid {
            warn!(recorded = %session.outcome(), "Recorded outcome is stale");
        }
        valid
    }
}

/// Asserts that all session invariants hold (panics on violation in debug builds).
#[instrument(skip(session))]
pub fn assert_invariants(session: &Session) {
    debug_assert!(
        BoardConsistent::holds(session.board()),
        "Board consistency violated"
    );
    debug_assert!(
        HistoryComplete::holds(session),
        "History completeness violated"
    );
    debug_assert!(OutcomeCurrent::holds(session), "Recorded outcome is stale");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coord, Participant};

    #[test]
    fn test_fresh_session_is_consistent() {
        let session = Session::new(Participant::human("ann"), Participant::Computer);
        assert!(BoardConsistent::holds(session.board()));
        assert!(HistoryComplete::holds(&session));
        assert!(OutcomeCurrent::holds(&session));
    }

    #[test]
    fn test_detects_naught_ahead() {
        let mut board = Board::new();
        board.place(Coord::new(0, 0).unwrap(), Mark::Naught).unwrap();
        assert!(!BoardConsistent::holds(&board));
    }

    #[test]
    fn test_detects_double_cross() {
        let mut board = Board::new();
        board.place(Coord::new(0, 0).unwrap(), Mark::Cross).unwrap();
        board.place(Coord::new(0, 1).unwrap(), Mark::Cross).unwrap();
        assert!(!BoardConsistent::holds(&board));
    }
}
