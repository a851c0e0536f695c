//! Identities of the people (and the computer) taking part in a game.

use serde::{Deserialize, Serialize};

/// Chat-platform identity of a human player.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One side of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    /// A human, identified by their chat identity.
    #[display("{}", _0)]
    Human(PlayerId),
    /// The synthetic computer opponent.
    #[display("BOT")]
    Computer,
}

impl Participant {
    /// Creates a human participant.
    pub fn human(id: impl Into<PlayerId>) -> Self {
        Participant::Human(id.into())
    }

    /// Returns true for the computer opponent.
    pub fn is_computer(&self) -> bool {
        matches!(self, Participant::Computer)
    }

    /// Returns the human identity, if any.
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Participant::Human(id) => Some(id),
            Participant::Computer => None,
        }
    }
}

impl From<PlayerId> for Participant {
    fn from(id: PlayerId) -> Self {
        Participant::Human(id)
    }
}
