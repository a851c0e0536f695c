//! Tic-tac-toe games hosted by a chat bot.
//!
//! # Architecture
//!
//! - **Controller**: timed lifecycle of one game (invitation, play, rematch)
//! - **Runner**: one tokio task per game, feeding events and timer firings
//! - **Registry**: owns running games and routes events to them
//! - **Console**: a line-oriented presentation adapter for the binary
//!
//! Game rules and the computer opponent live in `tictactoe_core`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod config;
pub mod console;
mod controller;
mod events;
mod registry;
mod runner;

pub use config::{BotConfig, ConfigError, FirstMover, Timing};
pub use controller::{
    Invitation, LifecycleController, LifecycleError, LifecycleState, Opponent, TimerSlot,
    TimerToken,
};
pub use events::{BoardView, CancelReason, Dispatch, GameId, InputEvent, PresentationRequest, Response};
pub use registry::{GameRegistry, RegistryError};
pub use runner::{Command, GameRunner};
