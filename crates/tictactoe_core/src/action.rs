//! First-class action types for tic-tac-toe.
//!
//! Moves are domain events, not side effects. They carry the mark and the
//! cell, and can be validated independently of execution and replayed.

use super::participant::Participant;
use super::position::Coord;
use super::types::Mark;
use serde::Serialize;

/// A move: a mark placed at a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_new::new)]
pub struct Move {
    /// The mark being placed.
    pub mark: Mark,
    /// Where it is placed.
    pub coord: Coord,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.coord)
    }
}

/// Error that can occur when validating or applying a move.
///
/// Every variant is an ordinary outcome of validating user input; none of
/// them leave the board changed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The coordinate is outside the 3x3 grid.
    #[display("Coordinate ({row}, {col}) is outside the board")]
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The cell at the coordinate is already occupied.
    #[display("Square {} is already occupied", _0)]
    IllegalMove(Coord),

    /// The actor is not the side to move.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(Participant),

    /// The game has already been decided.
    #[display("Game is already over")]
    GameAlreadyOver,
}

impl std::error::Error for MoveError {}

/// Error raised by a move selector.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SearchError {
    /// Search was asked to move on a board that is full or already decided.
    #[display("Search precondition violated: board is {}", _0)]
    PreconditionViolation(super::outcome::Outcome),
}

impl std::error::Error for SearchError {}

/// Error raised when the computer is asked to take its turn.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum ComputerMoveError {
    /// The side to move is not the computer.
    #[display("Computer asked to move on {}'s turn", _0)]
    #[from(skip)]
    NotComputersTurn(Participant),

    /// The move selector refused to search.
    #[display("{}", _0)]
    Search(SearchError),

    /// The selected move was rejected by the session.
    #[display("Selected move rejected: {}", _0)]
    Move(MoveError),
}

impl std::error::Error for ComputerMoveError {}
