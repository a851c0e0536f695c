//! Bot configuration: timing windows and seating for new games.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Who plays Cross (and therefore moves first) in a game against the computer.
///
/// Defaults to [`FirstMover::Human`] so the player moves first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FirstMover {
    /// The human plays Cross.
    #[default]
    Human,
    /// The computer plays Cross and opens every round.
    Computer,
}

/// Timing windows for one game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// How long the challenged player has to accept or deny.
    pub invitation: Duration,
    /// How long participants have to vote for a rematch.
    pub rematch: Duration,
    /// How long one round of play may last.
    pub round: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            invitation: Duration::from_secs(default_invitation_timeout_secs()),
            rematch: Duration::from_secs(default_rematch_timeout_secs()),
            round: Duration::from_secs(default_round_timeout_secs()),
        }
    }
}

/// Configuration for the bot, usually loaded from TOML.
///
/// ```toml
/// invitation_timeout_secs = 30
/// rematch_timeout_secs = 10
/// round_timeout_secs = 120
/// first_mover = "human"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct BotConfig {
    /// Seconds the challenged player has to answer an invitation.
    #[serde(default = "default_invitation_timeout_secs")]
    invitation_timeout_secs: u64,

    /// Seconds participants have to vote for a rematch.
    #[serde(default = "default_rematch_timeout_secs")]
    rematch_timeout_secs: u64,

    /// Seconds one round of play may last before the board locks.
    #[serde(default = "default_round_timeout_secs")]
    round_timeout_secs: u64,

    /// Seating for games against the computer.
    #[serde(default)]
    first_mover: FirstMover,
}

fn default_invitation_timeout_secs() -> u64 {
    30
}

fn default_rematch_timeout_secs() -> u64 {
    10
}

fn default_round_timeout_secs() -> u64 {
    120
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            invitation_timeout_secs: default_invitation_timeout_secs(),
            rematch_timeout_secs: default_rematch_timeout_secs(),
            round_timeout_secs: default_round_timeout_secs(),
            first_mover: FirstMover::default(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(
            invitation_secs = config.invitation_timeout_secs,
            rematch_secs = config.rematch_timeout_secs,
            round_secs = config.round_timeout_secs,
            first_mover = %config.first_mover,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the seating for games against the computer.
    pub fn with_first_mover(mut self, first_mover: FirstMover) -> Self {
        self.first_mover = first_mover;
        self
    }

    /// Converts the configured seconds into timing windows.
    pub fn timing(&self) -> Timing {
        Timing {
            invitation: Duration::from_secs(self.invitation_timeout_secs),
            rematch: Duration::from_secs(self.rematch_timeout_secs),
            round: Duration::from_secs(self.round_timeout_secs),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, secs) in [
            ("invitation_timeout_secs", self.invitation_timeout_secs),
            ("rematch_timeout_secs", self.rematch_timeout_secs),
            ("round_timeout_secs", self.round_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::new(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let timing = BotConfig::default().timing();
        assert_eq!(timing, Timing::default());
        assert_eq!(timing.invitation, Duration::from_secs(30));
        assert_eq!(timing.rematch, Duration::from_secs(10));
        assert_eq!(timing.round, Duration::from_secs(120));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = BotConfig::from_toml("rematch_timeout_secs = 20\nfirst_mover = \"computer\"")
            .expect("valid config");
        assert_eq!(*config.rematch_timeout_secs(), 20);
        assert_eq!(*config.invitation_timeout_secs(), 30);
        assert_eq!(*config.first_mover(), FirstMover::Computer);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = BotConfig::from_toml("round_timeout_secs = 0").unwrap_err();
        assert!(err.message.contains("round_timeout_secs"));
    }

    #[test]
    fn test_unknown_first_mover_rejected() {
        assert!(BotConfig::from_toml("first_mover = \"spectator\"").is_err());
    }
}
