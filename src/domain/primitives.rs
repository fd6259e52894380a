//! Domain primitives: UserId, PlayerId, MatchId, ChannelId, Coins.

use serde::{Deserialize, Serialize};

/// Virtual currency amount. Balances never go below zero.
pub type Coins = i64;

/// Chat-platform user identifier (kept as the platform's string form).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a UserId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalogue player identifier (e.g. "bat_0001").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a PlayerId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique id of one match instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchId(pub String);

impl MatchId {
    /// Create a MatchId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        MatchId(id.into())
    }

    /// Generate a fresh random match id.
    pub fn generate() -> Self {
        MatchId(uuid::Uuid::new_v4().to_string())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room/channel a match is hosted in. At most one active match per channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Create a ChannelId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        ChannelId(id.into())
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
