//! Match history persistence seam.

pub mod memory;

use crate::domain::{Difficulty, MatchFormat, MatchId, MatchResult, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryRecords;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted summary of a completed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub result: MatchResult,
    pub venue: String,
    pub overs: u32,
    pub format: MatchFormat,
    pub difficulty: Difficulty,
    pub finished_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn match_id(&self) -> &MatchId {
        &self.result.match_id
    }

    pub fn involves(&self, user: &UserId) -> bool {
        self.result.participants().contains(&user)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl UserRecord {
    /// Fold one result into the counters for `user`.
    pub fn apply(&mut self, result: &MatchResult, user: &UserId) {
        self.matches += 1;
        match &result.winner {
            None => self.ties += 1,
            Some(winner) if winner == user => self.wins += 1,
            Some(_) => self.losses += 1,
        }
    }
}

#[async_trait]
pub trait MatchRecordStore: Send + Sync {
    /// Store a record. Persisting the same match id again returns the
    /// existing id without touching counters.
    async fn persist(&self, record: &MatchRecord) -> Result<RecordId, RecordStoreError>;

    /// Most recent matches involving `user`, newest first.
    async fn history(&self, user: &UserId, limit: usize)
        -> Result<Vec<MatchRecord>, RecordStoreError>;

    async fn user_record(&self, user: &UserId) -> Result<UserRecord, RecordStoreError>;
}
