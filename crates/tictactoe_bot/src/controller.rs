//! Lifecycle controller: the timed state machine around one game instance.
//!
//! ```text
//! AwaitingInvitationResponse ──accept──▶ Active ──decided──▶ AwaitingRematchDecision
//!          │ deny / expiry                 │ round expiry            │ all votes ──▶ Active
//!          ▼                               ▼                         │ expiry
//!        Ended ◀───────────────────────────┴─────────────────────────┘
//! ```
//!
//! The controller owns its invitation or session exclusively. It never sleeps:
//! each waiting state publishes a single [`TimerSlot`] and whoever drives the
//! controller reports expiry back through [`LifecycleController::on_timeout`].
//! Every transition issues a fresh [`TimerToken`], so a firing or an event
//! that belongs to an earlier state is discarded instead of replayed.

use crate::config::{FirstMover, Timing};
use crate::events::{
    BoardView, CancelReason, GameId, InputEvent, PresentationRequest, Response,
};
use derive_getters::Getters;
use derive_more::Display;
use std::collections::BTreeSet;
use tictactoe_core::{ComputerMoveError, Participant, PlayerId, Session};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Who the challenger plays against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opponent {
    /// Another human, who must accept an invitation first.
    Human(PlayerId),
    /// The minimax computer opponent.
    Computer,
}

/// Externally visible state of a game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum LifecycleState {
    /// Waiting for the challenged player to accept or deny.
    AwaitingInvitationResponse,
    /// A round is being played.
    Active,
    /// The round is decided; waiting for rematch votes.
    AwaitingRematchDecision,
    /// Nothing more will happen.
    Ended,
}

/// A pending challenge between two humans.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Invitation {
    /// Who sent the challenge.
    challenger: PlayerId,
    /// Who must answer.
    challenged: PlayerId,
    /// When the invitation expires.
    deadline: Instant,
}

/// Identifies one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("timer-{}", _0)]
pub struct TimerToken(u64);

/// The single timer a waiting state needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSlot {
    /// Token to hand back to [`LifecycleController::on_timeout`].
    pub token: TimerToken,
    /// When the timer fires.
    pub deadline: Instant,
}

/// Failures that are bugs rather than user input.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LifecycleError {
    /// A player tried to challenge themselves.
    #[display("{} cannot challenge themselves", _0)]
    SelfChallenge(PlayerId),

    /// The controller asked the computer to move when it could not.
    #[display("Lifecycle invariant violated: {}", _0)]
    InvariantViolation(ComputerMoveError),
}

impl std::error::Error for LifecycleError {}

impl From<ComputerMoveError> for LifecycleError {
    fn from(err: ComputerMoveError) -> Self {
        LifecycleError::InvariantViolation(err)
    }
}

#[derive(Debug)]
enum Phase {
    AwaitingInvitation(Invitation),
    Active(Session),
    AwaitingRematch {
        session: Session,
        votes: BTreeSet<PlayerId>,
    },
    Ended(Option<Session>),
}

/// Drives one game instance from invitation to its final locked board.
#[derive(Debug)]
pub struct LifecycleController {
    game_id: GameId,
    timing: Timing,
    phase: Phase,
    epoch: u64,
    timer: Option<TimerSlot>,
    outbox: Vec<PresentationRequest>,
}

impl LifecycleController {
    /// Opens a duel: the challenged player has until the invitation window
    /// closes to answer.
    ///
    /// The challenged player plays Cross and moves first.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::SelfChallenge`] if both identities match.
    #[instrument(skip(timing))]
    pub fn duel(
        game_id: GameId,
        challenger: PlayerId,
        challenged: PlayerId,
        timing: Timing,
    ) -> Result<Self, LifecycleError> {
        if challenger == challenged {
            warn!(%game_id, %challenger, "Rejected self-challenge");
            return Err(LifecycleError::SelfChallenge(challenger));
        }

        let mut controller = Self::idle(game_id, timing);
        let deadline = Instant::now() + timing.invitation;
        let invitation = Invitation {
            challenger: challenger.clone(),
            challenged: challenged.clone(),
            deadline,
        };
        controller.transition(Phase::AwaitingInvitation(invitation), Some(deadline));
        controller.outbox.push(PresentationRequest::Invitation {
            challenger,
            challenged,
            expires_in_secs: timing.invitation.as_secs(),
        });

        info!(%game_id, "Duel invitation sent");
        Ok(controller)
    }

    /// Starts a game against the computer. No invitation is needed.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvariantViolation`] if the computer cannot
    /// make its opening move.
    #[instrument(skip(timing))]
    pub fn against_computer(
        game_id: GameId,
        player: PlayerId,
        first_mover: FirstMover,
        timing: Timing,
    ) -> Result<Self, LifecycleError> {
        let human = Participant::Human(player);
        let session = match first_mover {
            FirstMover::Human => Session::new(human, Participant::Computer),
            FirstMover::Computer => Session::new(Participant::Computer, human),
        };

        let mut controller = Self::idle(game_id, timing);
        controller.enter_active(session)?;
        info!(%game_id, %first_mover, "Computer game started");
        Ok(controller)
    }

    /// Starts a game against `opponent`, picking duel or computer mode.
    ///
    /// # Errors
    ///
    /// See [`LifecycleController::duel`] and
    /// [`LifecycleController::against_computer`].
    pub fn start(
        game_id: GameId,
        challenger: PlayerId,
        opponent: Opponent,
        first_mover: FirstMover,
        timing: Timing,
    ) -> Result<Self, LifecycleError> {
        match opponent {
            Opponent::Human(challenged) => Self::duel(game_id, challenger, challenged, timing),
            Opponent::Computer => Self::against_computer(game_id, challenger, first_mover, timing),
        }
    }

    fn idle(game_id: GameId, timing: Timing) -> Self {
        Self {
            game_id,
            timing,
            phase: Phase::Ended(None),
            epoch: 0,
            timer: None,
            outbox: Vec::new(),
        }
    }

    /// Returns the game id.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Returns the current state.
    pub fn state(&self) -> LifecycleState {
        match &self.phase {
            Phase::AwaitingInvitation(_) => LifecycleState::AwaitingInvitationResponse,
            Phase::Active(_) => LifecycleState::Active,
            Phase::AwaitingRematch { .. } => LifecycleState::AwaitingRematchDecision,
            Phase::Ended(_) => LifecycleState::Ended,
        }
    }

    /// Returns true once the instance can be disposed of.
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    /// Returns the pending invitation, if still waiting for an answer.
    pub fn invitation(&self) -> Option<&Invitation> {
        match &self.phase {
            Phase::AwaitingInvitation(invitation) => Some(invitation),
            _ => None,
        }
    }

    /// Returns the session, if one was ever created.
    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::AwaitingInvitation(_) => None,
            Phase::Active(session) | Phase::AwaitingRematch { session, .. } => Some(session),
            Phase::Ended(session) => session.as_ref(),
        }
    }

    /// Returns the armed timer, if the current state is waiting on one.
    pub fn timer(&self) -> Option<TimerSlot> {
        self.timer
    }

    /// Takes the presentation requests produced so far.
    pub fn drain(&mut self) -> Vec<PresentationRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Processes one input event and returns what to present.
    ///
    /// Events that do not apply to the current state, or that come from
    /// someone without a say in it, are discarded without changing anything.
    /// If the armed window has already closed, the expiry is applied instead
    /// and the event is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvariantViolation`] if the computer could not
    /// take its turn. The instance is ended before the error is returned.
    #[instrument(skip(self), fields(game_id = %self.game_id, state = %self.state()))]
    pub fn handle(&mut self, event: InputEvent) -> Result<Vec<PresentationRequest>, LifecycleError> {
        if let Some(slot) = self.timer
            && Instant::now() >= slot.deadline
        {
            debug!(actor = %event.actor(), "Event arrived after the window closed");
            return Ok(self.on_timeout(slot.token));
        }

        let phase = std::mem::replace(&mut self.phase, Phase::Ended(None));

        let result = match (phase, event) {
            (Phase::AwaitingInvitation(invitation), InputEvent::InvitationResponse { actor, response }) => {
                self.on_invitation_response(invitation, actor, response)
            }
            (Phase::Active(session), InputEvent::MoveAttempt { actor, row, col }) => {
                self.on_move(session, actor, row, col)
            }
            (Phase::AwaitingRematch { session, votes }, InputEvent::RematchVote { actor }) => {
                self.on_rematch_vote(session, votes, actor)
            }
            (phase, event) => {
                debug!(actor = %event.actor(), ?event, "Discarding event for another state");
                self.phase = phase;
                Ok(())
            }
        };

        if let Err(e) = &result {
            error!(error = %e, "Ending instance after invariant violation");
            self.dispose();
        }
        result.map(|()| self.drain())
    }

    /// Reports that the timer identified by `token` fired.
    ///
    /// Stale tokens (from a state that has already moved on) are ignored.
    #[instrument(skip(self), fields(game_id = %self.game_id, state = %self.state()))]
    pub fn on_timeout(&mut self, token: TimerToken) -> Vec<PresentationRequest> {
        match self.timer {
            Some(slot) if slot.token == token => {}
            _ => {
                debug!(%token, "Ignoring stale timer");
                return Vec::new();
            }
        }

        let phase = std::mem::replace(&mut self.phase, Phase::Ended(None));
        match phase {
            Phase::AwaitingInvitation(invitation) => {
                info!(challenged = %invitation.challenged, "Invitation timed out");
                self.cancel_invitation(invitation, CancelReason::TimedOut);
            }
            Phase::Active(session) => {
                info!(moves = session.history().len(), "Round window closed");
                self.lock(session);
            }
            Phase::AwaitingRematch { session, votes } => {
                info!(votes = votes.len(), "Rematch window closed");
                self.lock(session);
            }
            Phase::Ended(session) => {
                self.phase = Phase::Ended(session);
                self.timer = None;
            }
        }
        self.drain()
    }

    /// Ends the instance immediately and cancels its timer.
    ///
    /// Emits nothing; used on abort and shutdown.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn dispose(&mut self) {
        let session = match std::mem::replace(&mut self.phase, Phase::Ended(None)) {
            Phase::Active(session) | Phase::AwaitingRematch { session, .. } => Some(session),
            Phase::Ended(session) => session,
            Phase::AwaitingInvitation(_) => None,
        };
        self.transition(Phase::Ended(session), None);
        debug!("Instance disposed");
    }

    fn on_invitation_response(
        &mut self,
        invitation: Invitation,
        actor: PlayerId,
        response: Response,
    ) -> Result<(), LifecycleError> {
        if actor != invitation.challenged {
            debug!(%actor, "Ignoring invitation response from non-invitee");
            self.phase = Phase::AwaitingInvitation(invitation);
            return Ok(());
        }

        match response {
            Response::Accept => {
                info!(%actor, "Invitation accepted");
                let session = Session::new(
                    Participant::Human(invitation.challenged),
                    Participant::Human(invitation.challenger),
                );
                self.enter_active(session)
            }
            Response::Deny => {
                info!(%actor, "Invitation denied");
                self.cancel_invitation(invitation, CancelReason::Denied);
                Ok(())
            }
        }
    }

    fn on_move(
        &mut self,
        mut session: Session,
        actor: PlayerId,
        row: usize,
        col: usize,
    ) -> Result<(), LifecycleError> {
        let participant = Participant::Human(actor.clone());
        if session.mark_of(&participant).is_none() {
            debug!(%actor, "Ignoring move from non-participant");
            self.phase = Phase::Active(session);
            return Ok(());
        }

        let mut outcome = match session.apply_move(&participant, row, col) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%actor, row, col, error = %e, "Move rejected");
                self.outbox
                    .push(PresentationRequest::MoveRejected { actor, error: e });
                self.phase = Phase::Active(session);
                return Ok(());
            }
        };

        if !outcome.is_terminal() {
            self.outbox.push(PresentationRequest::Render(BoardView::live(&session)));
            if session.computer_to_move() {
                outcome = session.apply_computer_move()?;
                if !outcome.is_terminal() {
                    self.outbox.push(PresentationRequest::Render(BoardView::live(&session)));
                }
            }
        }

        if outcome.is_terminal() {
            self.enter_rematch(session);
        } else {
            self.phase = Phase::Active(session);
        }
        Ok(())
    }

    fn on_rematch_vote(
        &mut self,
        mut session: Session,
        mut votes: BTreeSet<PlayerId>,
        actor: PlayerId,
    ) -> Result<(), LifecycleError> {
        let required = required_votes(&session);
        if !required.contains(&actor) {
            debug!(%actor, "Ignoring rematch vote from non-participant");
            self.phase = Phase::AwaitingRematch { session, votes };
            return Ok(());
        }
        if !votes.insert(actor.clone()) {
            debug!(%actor, "Ignoring duplicate rematch vote");
            self.phase = Phase::AwaitingRematch { session, votes };
            return Ok(());
        }

        if votes.is_superset(&required) {
            info!(voters = votes.len(), "Rematch agreed");
            session.reset();
            return self.enter_active(session);
        }

        debug!(%actor, "Rematch vote counted");
        self.outbox.push(PresentationRequest::RematchPending {
            voted: votes.iter().cloned().collect(),
            waiting_for: required.difference(&votes).cloned().collect(),
        });
        self.phase = Phase::AwaitingRematch { session, votes };
        Ok(())
    }

    fn enter_active(&mut self, mut session: Session) -> Result<(), LifecycleError> {
        if session.computer_to_move() {
            session.apply_computer_move()?;
        }
        self.outbox.push(PresentationRequest::Render(BoardView::live(&session)));
        self.transition(Phase::Active(session), Some(Instant::now() + self.timing.round));
        Ok(())
    }

    fn enter_rematch(&mut self, session: Session) {
        info!(outcome = %session.outcome(), "Round decided");
        self.outbox.push(PresentationRequest::TerminalRender {
            view: BoardView::terminal(&session),
            rematch_window_secs: self.timing.rematch.as_secs(),
        });
        self.transition(
            Phase::AwaitingRematch {
                session,
                votes: BTreeSet::new(),
            },
            Some(Instant::now() + self.timing.rematch),
        );
    }

    fn cancel_invitation(&mut self, invitation: Invitation, reason: CancelReason) {
        self.outbox.push(PresentationRequest::Cancelled {
            challenger: invitation.challenger,
            challenged: invitation.challenged,
            reason,
        });
        self.transition(Phase::Ended(None), None);
    }

    fn lock(&mut self, session: Session) {
        self.outbox
            .push(PresentationRequest::Locked(BoardView::locked(&session)));
        self.transition(Phase::Ended(Some(session)), None);
    }

    /// Moves to `phase`, replacing whatever timer was armed.
    fn transition(&mut self, phase: Phase, deadline: Option<Instant>) {
        self.epoch += 1;
        self.phase = phase;
        self.timer = deadline.map(|deadline| TimerSlot {
            token: TimerToken(self.epoch),
            deadline,
        });
        debug!(state = %self.state(), epoch = self.epoch, timer = ?self.timer, "Transitioned");
    }
}

/// Humans who must vote before a rematch starts.
fn required_votes(session: &Session) -> BTreeSet<PlayerId> {
    [session.cross(), session.naught()]
        .into_iter()
        .filter_map(|participant| participant.player_id().cloned())
        .collect()
}
