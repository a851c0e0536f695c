//! Messages crossing the presentation boundary.
//!
//! The presentation adapter sends [`InputEvent`]s in and receives
//! [`Dispatch`]es out. Nothing here holds UI objects; every outgoing message
//! is a declarative snapshot.

use derive_getters::Getters;
use serde::{Deserialize, Serialize, Serializer};
use tictactoe_core::{Board, Coord, MoveError, Outcome, Participant, PlayerId, Session};

/// Identifier of one game instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("#{}", _0)]
#[serde(transparent)]
pub struct GameId(pub u64);

/// Answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Response {
    /// Start the game.
    Accept,
    /// Refuse the game.
    Deny,
}

/// A discrete user interaction, tagged with the actor's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// A player clicked a cell.
    MoveAttempt {
        /// Who clicked.
        actor: PlayerId,
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },
    /// The challenged player answered an invitation.
    InvitationResponse {
        /// Who answered.
        actor: PlayerId,
        /// Their answer.
        response: Response,
    },
    /// A participant asked to play again.
    RematchVote {
        /// Who voted.
        actor: PlayerId,
    },
}

impl InputEvent {
    /// Creates a move attempt.
    pub fn move_attempt(actor: impl Into<PlayerId>, row: usize, col: usize) -> Self {
        InputEvent::MoveAttempt {
            actor: actor.into(),
            row,
            col,
        }
    }

    /// Creates an accepting invitation response.
    pub fn accept(actor: impl Into<PlayerId>) -> Self {
        InputEvent::InvitationResponse {
            actor: actor.into(),
            response: Response::Accept,
        }
    }

    /// Creates a denying invitation response.
    pub fn deny(actor: impl Into<PlayerId>) -> Self {
        InputEvent::InvitationResponse {
            actor: actor.into(),
            response: Response::Deny,
        }
    }

    /// Creates a rematch vote.
    pub fn rematch_vote(actor: impl Into<PlayerId>) -> Self {
        InputEvent::RematchVote {
            actor: actor.into(),
        }
    }

    /// Returns the identity that produced the event.
    pub fn actor(&self) -> &PlayerId {
        match self {
            InputEvent::MoveAttempt { actor, .. }
            | InputEvent::InvitationResponse { actor, .. }
            | InputEvent::RematchVote { actor } => actor,
        }
    }
}

/// Why an invitation ended without a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CancelReason {
    /// The challenged player refused.
    Denied,
    /// Nobody answered in time.
    TimedOut,
}

/// Snapshot of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct BoardView {
    /// Board contents.
    board: Board,
    /// Current outcome, including the winning line if any.
    outcome: Outcome,
    /// Participant playing Cross.
    cross: Participant,
    /// Participant playing Naught.
    naught: Participant,
    /// Participant whose turn it is; `None` once the board is decided or locked.
    to_move: Option<Participant>,
    /// Cells that may be clicked right now.
    legal_moves: Vec<Coord>,
    /// Cells to highlight as the winning line.
    winning_line: Vec<Coord>,
    /// Whether cell controls accept input.
    controls_enabled: bool,
}

impl BoardView {
    /// Snapshot of a game in progress.
    ///
    /// Controls are only enabled while a human is to move.
    pub fn live(session: &Session) -> Self {
        let mut view = Self::snapshot(session);
        if !session.is_terminal() {
            view.to_move = Some(session.side_to_move().clone());
            if !session.computer_to_move() {
                view.legal_moves = session.legal_moves();
                view.controls_enabled = true;
            }
        }
        view
    }

    /// Snapshot of a decided game: winning line marked, controls disabled.
    pub fn terminal(session: &Session) -> Self {
        Self::snapshot(session)
    }

    /// Final snapshot: nothing accepts input any more.
    pub fn locked(session: &Session) -> Self {
        Self::snapshot(session)
    }

    fn snapshot(session: &Session) -> Self {
        Self {
            board: *session.board(),
            outcome: *session.outcome(),
            cross: session.cross().clone(),
            naught: session.naught().clone(),
            to_move: None,
            legal_moves: Vec::new(),
            winning_line: session.outcome().winning_line().to_vec(),
            controls_enabled: false,
        }
    }
}

/// A request for the presentation adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresentationRequest {
    /// Show an invitation with accept and deny controls.
    Invitation {
        /// Who sent the challenge.
        challenger: PlayerId,
        /// Who must answer.
        challenged: PlayerId,
        /// Seconds until the invitation expires.
        expires_in_secs: u64,
    },
    /// Show the board for the side to move.
    Render(BoardView),
    /// Show a decided board with a rematch control.
    TerminalRender {
        /// The decided board.
        view: BoardView,
        /// Seconds the rematch control stays open.
        rematch_window_secs: u64,
    },
    /// A rematch vote was counted; others still have to vote.
    RematchPending {
        /// Participants who voted.
        voted: Vec<PlayerId>,
        /// Participants still expected to vote.
        waiting_for: Vec<PlayerId>,
    },
    /// Final rendering with every control disabled.
    Locked(BoardView),
    /// The invitation ended without a game.
    Cancelled {
        /// Who sent the challenge.
        challenger: PlayerId,
        /// Who was challenged.
        challenged: PlayerId,
        /// Why it ended.
        reason: CancelReason,
    },
    /// A move was refused; nothing changed.
    MoveRejected {
        /// Who attempted the move.
        actor: PlayerId,
        /// Why it was refused.
        #[serde(serialize_with = "serialize_display")]
        error: MoveError,
    },
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}

/// A presentation request addressed to one game instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_new::new)]
pub struct Dispatch {
    /// The game this request belongs to.
    pub game_id: GameId,
    /// What to present.
    pub request: PresentationRequest,
}
