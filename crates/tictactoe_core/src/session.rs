//! One game's mutable state: board, turn, outcome and participants.

use super::action::{ComputerMoveError, Move, MoveError};
use super::contracts::assert_invariants;
use super::outcome::Outcome;
use super::participant::Participant;
use super::position::Coord;
use super::strategy::{Minimax, Strategy};
use super::types::{Board, Mark};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

/// A single game between two participants.
///
/// Cross always opens. Once the outcome is terminal the session accepts no
/// moves until [`Session::reset`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Session {
    /// The board.
    board: Board,
    /// Mark whose turn it is.
    #[getter(skip)]
    to_move: Mark,
    /// Outcome as of the last applied move.
    outcome: Outcome,
    /// Participant playing Cross.
    cross: Participant,
    /// Participant playing Naught.
    naught: Participant,
    /// Moves applied since the last reset.
    history: Vec<Move>,
}

impl Session {
    /// Creates a session with an empty board and Cross to move.
    #[instrument]
    pub fn new(cross: Participant, naught: Participant) -> Self {
        info!(%cross, %naught, "Creating session");
        Self {
            board: Board::new(),
            to_move: Mark::Cross,
            outcome: Outcome::InProgress,
            cross,
            naught,
            history: Vec::new(),
        }
    }

    /// Rebuilds a session by replaying `moves` from an empty board.
    ///
    /// # Errors
    ///
    /// Returns the first [`MoveError`] raised by the sequence.
    #[instrument(skip(moves), fields(moves = moves.len()))]
    pub fn replay(
        cross: Participant,
        naught: Participant,
        moves: &[Move],
    ) -> Result<Self, MoveError> {
        let mut session = Self::new(cross, naught);
        for mv in moves {
            let actor = session.participant(mv.mark).clone();
            session.apply_move(&actor, mv.coord.row(), mv.coord.col())?;
        }
        Ok(session)
    }

    /// Returns the mark whose turn it is.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Returns the participant playing `mark`.
    pub fn participant(&self, mark: Mark) -> &Participant {
        match mark {
            Mark::Cross => &self.cross,
            Mark::Naught => &self.naught,
        }
    }

    /// Returns the participant whose turn it is.
    pub fn side_to_move(&self) -> &Participant {
        self.participant(self.to_move)
    }

    /// Returns the mark played by `participant`, if they are seated here.
    pub fn mark_of(&self, participant: &Participant) -> Option<Mark> {
        if *participant == self.cross {
            Some(Mark::Cross)
        } else if *participant == self.naught {
            Some(Mark::Naught)
        } else {
            None
        }
    }

    /// Returns true once the game is decided.
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Returns true when the computer should move next.
    pub fn computer_to_move(&self) -> bool {
        !self.is_terminal() && self.side_to_move().is_computer()
    }

    /// Coordinates the side to move may play; empty once the game is decided.
    pub fn legal_moves(&self) -> Vec<Coord> {
        if self.is_terminal() {
            Vec::new()
        } else {
            Coord::valid_moves(&self.board)
        }
    }

    /// Applies a move for `actor`.
    ///
    /// Validation runs before anything is touched, so a rejected move leaves
    /// the session exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`MoveError::OutOfRange`] for coordinates outside the grid
    /// - [`MoveError::GameAlreadyOver`] once the outcome is terminal
    /// - [`MoveError::NotYourTurn`] if `actor` is not the side to move
    /// - [`MoveError::IllegalMove`] if the cell is occupied
    #[instrument(skip(self), fields(to_move = %self.to_move))]
    pub fn apply_move(
        &mut self,
        actor: &Participant,
        row: usize,
        col: usize,
    ) -> Result<Outcome, MoveError> {
        let coord = Coord::new(row, col).inspect_err(|e| {
            warn!(%actor, error = %e, "Move outside the board");
        })?;

        if self.is_terminal() {
            debug!(%actor, "Move after game over");
            return Err(MoveError::GameAlreadyOver);
        }

        if self.side_to_move() != actor {
            debug!(%actor, expected = %self.side_to_move(), "Move out of turn");
            return Err(MoveError::NotYourTurn(actor.clone()));
        }

        let mark = self.to_move;
        self.board.place(coord, mark)?;
        self.history.push(Move::new(mark, coord));

        self.outcome = self.board.evaluate();
        if !self.outcome.is_terminal() {
            self.to_move = mark.opponent();
        }

        assert_invariants(self);

        info!(%actor, %coord, outcome = %self.outcome, "Move applied");
        Ok(self.outcome)
    }

    /// Lets the computer take its turn using the minimax engine.
    ///
    /// # Errors
    ///
    /// See [`Session::apply_computer_move_with`].
    pub fn apply_computer_move(&mut self) -> Result<Outcome, ComputerMoveError> {
        self.apply_computer_move_with(&Minimax)
    }

    /// Lets the computer take its turn using `strategy`.
    ///
    /// # Errors
    ///
    /// - [`ComputerMoveError::NotComputersTurn`] when a human is to move
    /// - [`ComputerMoveError::Search`] when the board is already decided
    #[instrument(skip(self, strategy), fields(strategy = strategy.name()))]
    pub fn apply_computer_move_with<S>(&mut self, strategy: &S) -> Result<Outcome, ComputerMoveError>
    where
        S: Strategy + ?Sized,
    {
        if !self.side_to_move().is_computer() {
            return Err(ComputerMoveError::NotComputersTurn(
                self.side_to_move().clone(),
            ));
        }

        let coord = strategy.choose(&self.board, self.to_move)?;
        let outcome = self.apply_move(&Participant::Computer, coord.row(), coord.col())?;
        Ok(outcome)
    }

    /// Clears the board for a rematch, keeping the participants.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board.reset();
        self.to_move = Mark::Cross;
        self.outcome = Outcome::InProgress;
        self.history.clear();
        info!(cross = %self.cross, naught = %self.naught, "Session reset");
    }
}
