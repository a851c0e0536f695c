//! Pure tic-tac-toe game logic.
//!
//! # Architecture
//!
//! - **Board**: fixed 3x3 grid with win and draw evaluation
//! - **Search**: exhaustive minimax with alpha-beta pruning for the computer
//! - **Session**: one game's board, turn, outcome and participants
//!
//! Nothing here knows about timers, chat platforms or rendering; the
//! lifecycle around a session lives in `tictactoe_bot`.
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{Outcome, Participant, Session};
//!
//! let mut session = Session::new(Participant::human("ann"), Participant::Computer);
//! let ann = Participant::human("ann");
//!
//! session.apply_move(&ann, 1, 1)?;
//! session.apply_computer_move()?;
//! assert_eq!(session.history().len(), 2);
//! assert_eq!(*session.outcome(), Outcome::InProgress);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod contracts;
mod outcome;
mod participant;
mod position;
pub mod rules;
mod search;
mod session;
mod strategy;
mod types;

pub use action::{ComputerMoveError, Move, MoveError, SearchError};
pub use contracts::{BoardConsistent, HistoryComplete, OutcomeCurrent, assert_invariants};
pub use outcome::Outcome;
pub use participant::{Participant, PlayerId};
pub use position::Coord;
pub use search::best_move;
pub use session::Session;
pub use strategy::{FirstAvailable, Minimax, Strategy};
pub use types::{Board, Cell, Mark};
