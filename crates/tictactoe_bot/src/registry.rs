//! Registry of running game instances.

use crate::config::{BotConfig, FirstMover};
use crate::controller::{LifecycleController, LifecycleError, Opponent};
use crate::events::{Dispatch, GameId, InputEvent};
use crate::runner::{Command, GameRunner};
use derive_more::Display;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tictactoe_core::PlayerId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum RegistryError {
    /// No instance with this id is registered.
    #[display("No game {}", _0)]
    UnknownGame(GameId),

    /// The instance finished before the request reached it.
    #[display("Game {} has already ended", _0)]
    GameEnded(GameId),

    /// The instance could not be created.
    #[display("{}", _0)]
    Lifecycle(LifecycleError),
}

impl std::error::Error for RegistryError {}

impl From<LifecycleError> for RegistryError {
    fn from(err: LifecycleError) -> Self {
        RegistryError::Lifecycle(err)
    }
}

#[derive(Debug)]
struct GameHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<anyhow::Result<crate::controller::LifecycleState>>,
}

/// Owns every running game instance.
///
/// Each instance runs on its own task; the registry only holds the sending
/// half of its command channel. Cloning shares the same set of games.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    games: Arc<Mutex<HashMap<GameId, GameHandle>>>,
    next_id: Arc<AtomicU64>,
    config: BotConfig,
    dispatch_tx: mpsc::UnboundedSender<Dispatch>,
}

impl GameRegistry {
    /// Creates an empty registry that publishes to `dispatch_tx`.
    #[instrument(skip(dispatch_tx))]
    pub fn new(config: BotConfig, dispatch_tx: mpsc::UnboundedSender<Dispatch>) -> Self {
        info!("Creating game registry");
        Self {
            games: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            config,
            dispatch_tx,
        }
    }

    /// Returns the configuration new games are created with.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Starts a duel by inviting `challenged`.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self))]
    pub fn start_duel(
        &self,
        challenger: PlayerId,
        challenged: PlayerId,
    ) -> Result<GameId, RegistryError> {
        self.start(challenger, Opponent::Human(challenged), *self.config.first_mover())
    }

    /// Starts a game against the computer.
    ///
    /// `first_mover` overrides the configured seating for this game only.
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self))]
    pub fn start_bot(
        &self,
        player: PlayerId,
        first_mover: Option<FirstMover>,
    ) -> Result<GameId, RegistryError> {
        let first_mover = first_mover.unwrap_or(*self.config.first_mover());
        self.start(player, Opponent::Computer, first_mover)
    }

    fn start(
        &self,
        challenger: PlayerId,
        opponent: Opponent,
        first_mover: FirstMover,
    ) -> Result<GameId, RegistryError> {
        let game_id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let controller = LifecycleController::start(
            game_id,
            challenger,
            opponent,
            first_mover,
            self.config.timing(),
        )?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let runner = GameRunner::new(controller, command_rx, self.dispatch_tx.clone());
        let task = tokio::spawn(runner.run());

        self.lock().insert(game_id, GameHandle { commands, task });
        info!(%game_id, "Registered game");
        Ok(game_id)
    }

    /// Forwards `event` to its game instance.
    #[instrument(skip(self))]
    pub fn submit(&self, game_id: GameId, event: InputEvent) -> Result<(), RegistryError> {
        let games = self.lock();
        let handle = games
            .get(&game_id)
            .ok_or(RegistryError::UnknownGame(game_id))?;
        handle.commands.send(Command::Event(event)).map_err(|_| {
            debug!(%game_id, "Event for finished game");
            RegistryError::GameEnded(game_id)
        })
    }

    /// Disposes of one instance and forgets it.
    #[instrument(skip(self))]
    pub fn abort(&self, game_id: GameId) -> Result<(), RegistryError> {
        let handle = self
            .lock()
            .remove(&game_id)
            .ok_or(RegistryError::UnknownGame(game_id))?;
        if handle.commands.send(Command::Shutdown).is_err() {
            debug!(%game_id, "Aborted game had already finished");
        }
        info!(%game_id, "Game aborted");
        Ok(())
    }

    /// Forgets instances whose task has finished. Returns how many were removed.
    #[instrument(skip(self))]
    pub fn reap(&self) -> usize {
        let mut games = self.lock();
        let before = games.len();
        games.retain(|_, handle| !handle.task.is_finished());
        let reaped = before - games.len();
        if reaped > 0 {
            debug!(reaped, remaining = games.len(), "Reaped finished games");
        }
        reaped
    }

    /// Ids of registered instances, in creation order.
    pub fn active_games(&self) -> Vec<GameId> {
        let mut ids: Vec<_> = self.lock().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Disposes of every instance and waits for their tasks to stop.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.lock().drain().collect();
        info!(count = handles.len(), "Shutting down games");

        for (_, handle) in &handles {
            // A closed channel means the task already stopped.
            let _ = handle.commands.send(Command::Shutdown);
        }
        for (game_id, handle) in handles {
            match handle.task.await {
                Ok(Ok(state)) => debug!(%game_id, %state, "Game stopped"),
                Ok(Err(e)) => warn!(%game_id, error = %e, "Game had failed"),
                Err(e) => error!(%game_id, error = %e, "Game task panicked"),
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<GameId, GameHandle>> {
        self.games.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
