//! Minimax search with alpha-beta pruning for the computer opponent.
//!
//! The search is exhaustive: a 3x3 board has few enough reachable positions
//! that no depth limit or static evaluation is needed. Leaves are scored from
//! the computer's point of view as +1 (computer wins), -1 (opponent wins) and
//! 0 (draw), so the computer never loses and wins whenever the opponent errs.
//!
//! Each node works on its own copy of the board. The caller's board is only
//! read.

use super::action::SearchError;
use super::outcome::Outcome;
use super::position::Coord;
use super::types::{Board, Cell, Mark};
use tracing::{debug, instrument};

const WIN: i8 = 1;
const LOSS: i8 = -1;
const DRAW: i8 = 0;

// Strictly outside the score range so the first child always replaces it.
const NEG_INF: i8 = -2;
const POS_INF: i8 = 2;

/// Returns the optimal move for `computer` on `board`.
///
/// Ties between equally scored moves go to the first one in row-major order.
///
/// # Errors
///
/// Returns [`SearchError::PreconditionViolation`] if the board is already
/// decided (won or full).
#[instrument(skip(board), fields(occupied = board.occupied()))]
pub fn best_move(board: &Board, computer: Mark) -> Result<Coord, SearchError> {
    let outcome = board.evaluate();
    if outcome.is_terminal() {
        return Err(SearchError::PreconditionViolation(outcome));
    }

    let mut alpha = NEG_INF;
    let mut best: Option<(Coord, i8)> = None;

    for coord in board.empty_cells() {
        let child = with_mark(board, coord, computer);
        let score = minimax(&child, computer.opponent(), computer, alpha, POS_INF);

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((coord, score));
        }
        alpha = alpha.max(score);
        if score == WIN {
            break;
        }
    }

    // A non-terminal board always has an empty cell.
    let (coord, score) = best.ok_or(SearchError::PreconditionViolation(outcome))?;
    debug!(%coord, score, "Search selected move");
    Ok(coord)
}

/// Scores `board` with `to_move` about to play.
fn minimax(board: &Board, to_move: Mark, computer: Mark, mut alpha: i8, mut beta: i8) -> i8 {
    if let Some(score) = terminal_score(board.evaluate(), computer) {
        return score;
    }

    if to_move == computer {
        let mut value = NEG_INF;
        for coord in board.empty_cells() {
            let child = with_mark(board, coord, to_move);
            value = value.max(minimax(&child, to_move.opponent(), computer, alpha, beta));
            alpha = alpha.max(value);
            if beta <= alpha {
                break;
            }
        }
        value
    } else {
        let mut value = POS_INF;
        for coord in board.empty_cells() {
            let child = with_mark(board, coord, to_move);
            value = value.min(minimax(&child, to_move.opponent(), computer, alpha, beta));
            beta = beta.min(value);
            if beta <= alpha {
                break;
            }
        }
        value
    }
}

fn terminal_score(outcome: Outcome, computer: Mark) -> Option<i8> {
    match outcome {
        Outcome::InProgress => None,
        Outcome::Draw => Some(DRAW),
        Outcome::Win { winner, .. } if winner == computer => Some(WIN),
        Outcome::Win { .. } => Some(LOSS),
    }
}

fn with_mark(board: &Board, coord: Coord, mark: Mark) -> Board {
    let mut child = *board;
    child.set(coord, Cell::Occupied(mark));
    child
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(row: usize, col: usize) -> Coord {
        Coord::new(row, col).unwrap()
    }

    fn board_from(marks: &[(usize, usize, Mark)]) -> Board {
        let mut board = Board::new();
        for &(row, col, mark) in marks {
            board.place(coord(row, col), mark).unwrap();
        }
        board
    }

    #[test]
    fn test_takes_immediate_win() {
        use Mark::{Cross as X, Naught as O};
        // O O . / X X . / X . .
        let board = board_from(&[(0, 0, O), (0, 1, O), (1, 0, X), (1, 1, X), (2, 0, X)]);
        assert_eq!(best_move(&board, O), Ok(coord(0, 2)));
    }

    #[test]
    fn test_blocks_opponent_win() {
        use Mark::{Cross as X, Naught as O};
        // X X . / . O . / . . .
        let board = board_from(&[(0, 0, X), (0, 1, X), (1, 1, O)]);
        assert_eq!(best_move(&board, O), Ok(coord(0, 2)));
    }

    #[test]
    fn test_answers_corner_opening_with_center() {
        let board = board_from(&[(0, 0, Mark::Cross)]);
        assert_eq!(best_move(&board, Mark::Naught), Ok(coord(1, 1)));
    }

    #[test]
    fn test_empty_board_picks_first_optimal_cell() {
        // Every opening draws with best play, so row-major order picks the corner.
        assert_eq!(best_move(&Board::new(), Mark::Cross), Ok(coord(0, 0)));
    }

    #[test]
    fn test_does_not_mutate_callers_board() {
        let board = board_from(&[(0, 0, Mark::Cross)]);
        let before = board;
        let _ = best_move(&board, Mark::Naught);
        assert_eq!(board, before);
    }

    #[test]
    fn test_rejects_decided_board() {
        let board = board_from(&[
            (0, 0, Mark::Cross),
            (0, 1, Mark::Cross),
            (0, 2, Mark::Cross),
            (1, 0, Mark::Naught),
            (1, 1, Mark::Naught),
        ]);
        assert!(matches!(
            best_move(&board, Mark::Naught),
            Err(SearchError::PreconditionViolation(Outcome::Win { .. }))
        ));
    }
}
