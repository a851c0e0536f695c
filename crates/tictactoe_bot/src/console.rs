//! Line-oriented console adapter: parses typed commands and renders dispatches.
//!
//! ```text
//! duel ann bob              ann challenges bob
//! bot ann [--computer-first]
//! accept 1 bob | deny 1 bob
//! move 1 bob 1 1
//! rematch 1 ann
//! abort 1
//! games
//! quit
//! ```

use crate::config::FirstMover;
use crate::events::{BoardView, CancelReason, Dispatch, GameId, InputEvent, PresentationRequest};
use derive_more::Display;
use tictactoe_core::{Outcome, Participant, PlayerId};

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Invite another player.
    Duel {
        /// Who sends the invitation.
        challenger: PlayerId,
        /// Who receives it.
        challenged: PlayerId,
    },
    /// Play the computer.
    Bot {
        /// The human player.
        player: PlayerId,
        /// Seating override for this game.
        first_mover: Option<FirstMover>,
    },
    /// Forward an interaction to a running game.
    Input {
        /// Target game.
        game_id: GameId,
        /// The interaction.
        event: InputEvent,
    },
    /// Dispose of a game.
    Abort(GameId),
    /// List running games.
    Games,
    /// Stop every game and exit.
    Quit,
}

/// Errors from parsing a console line.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CommandError {
    /// The first word is not a known command.
    #[display("Unknown command '{}'", _0)]
    Unknown(String),

    /// A required argument was not given.
    #[display("Missing {}", _0)]
    MissingArgument(&'static str),

    /// An argument that should be a number was not.
    #[display("Expected a number for {}, got '{}'", name, value)]
    InvalidNumber {
        /// Which argument.
        name: &'static str,
        /// What was typed.
        value: String,
    },

    /// More arguments than the command takes.
    #[display("Unexpected argument '{}'", _0)]
    Unexpected(String),
}

impl std::error::Error for CommandError {}

/// Parses one console line. Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "duel" => ConsoleCommand::Duel {
            challenger: player(&mut words, "challenger")?,
            challenged: player(&mut words, "challenged player")?,
        },
        "bot" => {
            let player = player(&mut words, "player")?;
            let first_mover = match words.next() {
                None => None,
                Some("--computer-first") => Some(FirstMover::Computer),
                Some("--human-first") => Some(FirstMover::Human),
                Some(other) => return Err(CommandError::Unexpected(other.to_string())),
            };
            ConsoleCommand::Bot {
                player,
                first_mover,
            }
        }
        "accept" | "deny" => {
            let game_id = game(&mut words)?;
            let actor = player(&mut words, "player")?;
            let event = if verb.eq_ignore_ascii_case("accept") {
                InputEvent::accept(actor)
            } else {
                InputEvent::deny(actor)
            };
            ConsoleCommand::Input { game_id, event }
        }
        "move" => {
            let game_id = game(&mut words)?;
            let actor = player(&mut words, "player")?;
            let row = number(&mut words, "row")?;
            let col = number(&mut words, "col")?;
            ConsoleCommand::Input {
                game_id,
                event: InputEvent::move_attempt(actor, row, col),
            }
        }
        "rematch" => {
            let game_id = game(&mut words)?;
            let actor = player(&mut words, "player")?;
            ConsoleCommand::Input {
                game_id,
                event: InputEvent::rematch_vote(actor),
            }
        }
        "abort" => ConsoleCommand::Abort(game(&mut words)?),
        "games" => ConsoleCommand::Games,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    match words.next() {
        Some(extra) => Err(CommandError::Unexpected(extra.to_string())),
        None => Ok(Some(command)),
    }
}

fn player<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<PlayerId, CommandError> {
    words
        .next()
        .map(PlayerId::from)
        .ok_or(CommandError::MissingArgument(name))
}

fn number<'a, T: std::str::FromStr>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, CommandError> {
    let word = words.next().ok_or(CommandError::MissingArgument(name))?;
    word.parse().map_err(|_| CommandError::InvalidNumber {
        name,
        value: word.to_string(),
    })
}

fn game<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<GameId, CommandError> {
    let word = words.next().ok_or(CommandError::MissingArgument("game id"))?;
    word.trim_start_matches('#')
        .parse()
        .map(GameId)
        .map_err(|_| CommandError::InvalidNumber {
            name: "game id",
            value: word.to_string(),
        })
}

/// Renders a dispatch as one JSON line.
pub fn render_json(dispatch: &Dispatch) -> Result<String, serde_json::Error> {
    serde_json::to_string(dispatch)
}

/// Renders a dispatch as human-readable text.
pub fn render_text(dispatch: &Dispatch) -> String {
    let id = dispatch.game_id;
    match &dispatch.request {
        PresentationRequest::Invitation {
            challenger,
            challenged,
            expires_in_secs,
        } => format!(
            "{id} {challenger} challenges {challenged} to tic-tac-toe. \
             {challenged}: accept {} {challenged} | deny {} {challenged} ({expires_in_secs}s)",
            id.0, id.0
        ),
        PresentationRequest::Render(view) => {
            let turn = match view.to_move() {
                Some(participant) => format!("{} to move", seat(view, participant)),
                None => String::new(),
            };
            format!("{}\n{turn}", board_text(id, view))
        }
        PresentationRequest::TerminalRender {
            view,
            rematch_window_secs,
        } => format!(
            "{}\n{}. rematch {} <player> within {rematch_window_secs}s",
            board_text(id, view),
            result_text(view),
            id.0
        ),
        PresentationRequest::RematchPending { voted, waiting_for } => format!(
            "{id} rematch: {} voted, waiting for {}",
            join(voted),
            join(waiting_for)
        ),
        PresentationRequest::Locked(view) => {
            format!("{}\n{}. Game over", board_text(id, view), result_text(view))
        }
        PresentationRequest::Cancelled {
            challenger,
            challenged,
            reason,
        } => match reason {
            CancelReason::Denied => {
                format!("{id} {challenged} declined the challenge from {challenger}")
            }
            CancelReason::TimedOut => {
                format!("{id} {challenged} did not answer {challenger} in time")
            }
        },
        PresentationRequest::MoveRejected { actor, error } => format!("{id} {actor}: {error}"),
    }
}

fn board_text(id: GameId, view: &BoardView) -> String {
    format!(
        "{id} X: {}  O: {}\n{}",
        view.cross(),
        view.naught(),
        view.board().display()
    )
}

fn seat(view: &BoardView, participant: &Participant) -> String {
    let mark = if participant == view.cross() { "X" } else { "O" };
    format!("{participant} ({mark})")
}

fn result_text(view: &BoardView) -> String {
    match view.outcome() {
        Outcome::Win { winner, .. } => {
            let participant = match winner {
                tictactoe_core::Mark::Cross => view.cross(),
                tictactoe_core::Mark::Naught => view.naught(),
            };
            format!("{participant} wins")
        }
        Outcome::Draw => "Draw".to_string(),
        Outcome::InProgress => "Unfinished".to_string(),
    }
}

fn join(ids: &[PlayerId]) -> String {
    ids.iter()
        .map(PlayerId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let command = parse_command("move #3 bob 1 2").unwrap();
        assert_eq!(
            command,
            Some(ConsoleCommand::Input {
                game_id: GameId(3),
                event: InputEvent::move_attempt("bob", 1, 2),
            })
        );
    }

    #[test]
    fn test_parse_bot_seating() {
        assert_eq!(
            parse_command("bot ann --computer-first").unwrap(),
            Some(ConsoleCommand::Bot {
                player: PlayerId::from("ann"),
                first_mover: Some(FirstMover::Computer),
            })
        );
        assert_eq!(
            parse_command("BOT ann").unwrap(),
            Some(ConsoleCommand::Bot {
                player: PlayerId::from("ann"),
                first_mover: None,
            })
        );
    }

    #[test]
    fn test_blank_line_is_nothing() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_command("fly away"),
            Err(CommandError::Unknown("fly".to_string()))
        );
        assert_eq!(
            parse_command("move 1 bob x 1"),
            Err(CommandError::InvalidNumber {
                name: "row",
                value: "x".to_string()
            })
        );
        assert_eq!(
            parse_command("duel ann"),
            Err(CommandError::MissingArgument("challenged player"))
        );
        assert_eq!(
            parse_command("abort 1 2"),
            Err(CommandError::Unexpected("2".to_string()))
        );
    }

    #[test]
    fn test_render_cancelled() {
        let dispatch = Dispatch::new(
            GameId(1),
            PresentationRequest::Cancelled {
                challenger: "ann".into(),
                challenged: "bob".into(),
                reason: CancelReason::TimedOut,
            },
        );
        assert_eq!(render_text(&dispatch), "#1 bob did not answer ann in time");

        let json: serde_json::Value = serde_json::from_str(&render_json(&dispatch).unwrap()).unwrap();
        assert_eq!(json["game_id"], 1);
        assert_eq!(json["request"]["kind"], "cancelled");
        assert_eq!(json["request"]["reason"], "timed-out");
    }
}
