//! Coin ledger seam.
//!
//! Every mutation is a single atomic operation checked against the balance at
//! call time. Debits never fail for lack of funds: they clamp to what is
//! available and report how much was actually taken.
//!
//! Keyed mutations (`credit_once`, `debit_once`) are applied at most once per
//! [`PostingKey`]; the key is stored with the journal entry in the same write.

pub mod memory;

use crate::domain::{Coins, MatchId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryLedger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Coins),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Identifies one logical ledger posting, e.g. the win reward of a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingKey(String);

impl PostingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn for_match(match_id: &MatchId, user: &UserId, reason: &str) -> Self {
        Self(format!("{}:{}:{}", match_id, user, reason))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitReceipt {
    pub requested: Coins,
    pub debited: Coins,
    pub balance_after: Coins,
}

impl DebitReceipt {
    /// Whether the full amount was taken.
    pub fn is_full(&self) -> bool {
        self.debited == self.requested
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub user: UserId,
    /// Positive for credits, negative for debits.
    pub delta: Coins,
    pub reason: String,
    pub balance_after: Coins,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Open a wallet with `opening` coins if none exists. Returns the balance.
    async fn ensure_account(&self, user: &UserId, opening: Coins) -> Result<Coins, LedgerError>;

    /// Current balance; zero for unknown users.
    async fn balance(&self, user: &UserId) -> Result<Coins, LedgerError>;

    /// Add coins. Returns the new balance.
    async fn credit(&self, user: &UserId, amount: Coins, reason: &str)
        -> Result<Coins, LedgerError>;

    /// Take up to `amount` coins, never below zero.
    async fn debit(
        &self,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<DebitReceipt, LedgerError>;

    /// Credit once per key. `None` when the key was already posted.
    async fn credit_once(
        &self,
        key: &PostingKey,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Option<Coins>, LedgerError>;

    /// Clamped debit, once per key. `None` when the key was already posted.
    /// A keyed debit that finds nothing to take still consumes its key.
    async fn debit_once(
        &self,
        key: &PostingKey,
        user: &UserId,
        amount: Coins,
        reason: &str,
    ) -> Result<Option<DebitReceipt>, LedgerError>;

    /// Journal entries for a user, newest first.
    async fn journal(&self, user: &UserId, limit: usize) -> Result<Vec<JournalEntry>, LedgerError>;
}

pub(crate) fn check_amount(amount: Coins) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}
