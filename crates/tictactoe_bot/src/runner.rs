//! Runs one lifecycle controller as an independent tokio task.

use crate::controller::{LifecycleController, LifecycleState};
use crate::events::{Dispatch, InputEvent, PresentationRequest};
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument};

/// Messages accepted by a running instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A user interaction for this instance.
    Event(InputEvent),
    /// Dispose of the instance now.
    Shutdown,
}

/// Owns a controller and feeds it events and timer firings in order.
pub struct GameRunner {
    controller: LifecycleController,
    commands: mpsc::UnboundedReceiver<Command>,
    dispatch_tx: mpsc::UnboundedSender<Dispatch>,
}

impl GameRunner {
    /// Creates a runner for `controller`.
    pub fn new(
        controller: LifecycleController,
        commands: mpsc::UnboundedReceiver<Command>,
        dispatch_tx: mpsc::UnboundedSender<Dispatch>,
    ) -> Self {
        Self {
            controller,
            commands,
            dispatch_tx,
        }
    }

    /// Runs until the instance ends, is shut down, or loses its command channel.
    ///
    /// Returns the state the controller finished in.
    ///
    /// # Errors
    ///
    /// Fails if the controller reports an invariant violation or the
    /// presentation side has gone away. Either way the instance is disposed.
    #[instrument(skip(self), fields(game_id = %self.controller.game_id()))]
    pub async fn run(mut self) -> Result<LifecycleState> {
        info!("Game instance started");
        let opening = self.controller.drain();
        self.publish(opening)?;

        while !self.controller.is_ended() {
            let timer = self.controller.timer();
            let deadline = timer.map_or_else(Instant::now, |slot| slot.deadline);

            tokio::select! {
                biased;

                // A window that has closed wins over anything queued behind it.
                () = sleep_until(deadline), if timer.is_some() => {
                    if let Some(slot) = timer {
                        let requests = self.controller.on_timeout(slot.token);
                        self.publish(requests)?;
                    }
                }

                command = self.commands.recv() => match command {
                    Some(Command::Event(event)) => {
                        let requests = self
                            .controller
                            .handle(event)
                            .context("Game instance stopped")?;
                        self.publish(requests)?;
                    }
                    Some(Command::Shutdown) => {
                        info!("Shutdown requested");
                        self.controller.dispose();
                    }
                    None => {
                        debug!("Command channel closed");
                        self.controller.dispose();
                    }
                },
            }
        }

        let state = self.controller.state();
        info!(%state, "Game instance finished");
        Ok(state)
    }

    fn publish(&self, requests: Vec<PresentationRequest>) -> Result<()> {
        let game_id = self.controller.game_id();
        for request in requests {
            self.dispatch_tx
                .send(Dispatch::new(game_id, request))
                .context("Presentation channel closed")?;
        }
        Ok(())
    }
}
