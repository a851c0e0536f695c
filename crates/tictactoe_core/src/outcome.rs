//! Outcome of evaluating a board.

use super::position::Coord;
use super::types::Mark;
use serde::Serialize;

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// No line is complete and empty cells remain.
    InProgress,
    /// A line is complete.
    Win {
        /// Owner of the completed line.
        winner: Mark,
        /// The completed row, column or diagonal.
        line: [Coord; 3],
    },
    /// The board is full with no complete line.
    Draw,
}

impl Outcome {
    /// Returns true once the game is decided.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Win { winner, .. } => Some(*winner),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }

    /// Returns the winning line, or an empty slice for draws and games in progress.
    pub fn winning_line(&self) -> &[Coord] {
        match self {
            Outcome::Win { line, .. } => line,
            Outcome::InProgress | Outcome::Draw => &[],
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "In progress"),
            Outcome::Win { winner, line } => {
                write!(f, "{winner} wins along {} {} {}", line[0], line[1], line[2])
            }
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_serializes_with_status_and_line() {
        let line = [
            Coord::new(0, 2).unwrap(),
            Coord::new(1, 1).unwrap(),
            Coord::new(2, 0).unwrap(),
        ];
        let json = serde_json::to_value(Outcome::Win {
            winner: Mark::Naught,
            line,
        })
        .unwrap();

        assert_eq!(json["status"], "win");
        assert_eq!(json["line"].as_array().map(Vec::len), Some(3));
        assert_eq!(serde_json::to_value(Outcome::Draw).unwrap()["status"], "draw");
    }
}
