//! Settlement: persist the result once, then pay out once.
//!
//! Each payout is posted under its own key (match, user, reason), so a run
//! that failed halfway is finished by the next one without paying anything
//! twice.

use crate::domain::{Coins, MatchId, MatchResult, UserId};
use crate::ledger::{DebitReceipt, Ledger, LedgerError, PostingKey};
use crate::records::{MatchRecord, MatchRecordStore, RecordId, RecordStoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

const FORFEIT_REASON: &str = "forfeit penalty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSchedule {
    pub win_reward: Coins,
    pub participation_reward: Coins,
    pub forfeit_penalty: Coins,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            win_reward: 5000,
            participation_reward: 1000,
            forfeit_penalty: 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Records(#[from] RecordStoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub user: UserId,
    pub amount: Coins,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub record_id: RecordId,
    pub credits: Vec<Credit>,
    /// True when an earlier run already paid out.
    pub already_settled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyReport {
    pub user: UserId,
    pub receipt: Option<DebitReceipt>,
    pub already_settled: bool,
}

#[derive(Clone)]
pub struct Settler {
    ledger: Arc<dyn Ledger>,
    records: Arc<dyn MatchRecordStore>,
    rewards: RewardSchedule,
}

impl Settler {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        records: Arc<dyn MatchRecordStore>,
        rewards: RewardSchedule,
    ) -> Self {
        Self {
            ledger,
            records,
            rewards,
        }
    }

    pub fn rewards(&self) -> RewardSchedule {
        self.rewards
    }

    /// Persist a completed match and credit rewards exactly once.
    pub async fn settle(&self, record: &MatchRecord) -> Result<SettlementReport, SettlementError> {
        let result = &record.result;
        let record_id = self.records.persist(record).await?;

        let mut credits = Vec::new();
        let mut skipped = 0;
        for (user, amount, reason) in self.payouts(result) {
            if amount <= 0 {
                continue;
            }
            let key = PostingKey::for_match(&result.match_id, &user, reason);
            match self.ledger.credit_once(&key, &user, amount, reason).await? {
                Some(_) => {
                    tracing::info!(match_id = %result.match_id, user = %user, amount, reason, "credited");
                    credits.push(Credit {
                        user,
                        amount,
                        reason: reason.to_string(),
                    });
                }
                None => skipped += 1,
            }
        }

        let already_settled = credits.is_empty() && skipped > 0;
        if already_settled {
            tracing::info!(match_id = %result.match_id, "match already settled, skipping payout");
        }
        Ok(SettlementReport {
            record_id,
            credits,
            already_settled,
        })
    }

    fn payouts(&self, result: &MatchResult) -> Vec<(UserId, Coins, &'static str)> {
        match (&result.winner, result.loser()) {
            (Some(winner), Some(loser)) => vec![
                (winner.clone(), self.rewards.win_reward, "match win"),
                (loser.clone(), self.rewards.participation_reward, "match participation"),
            ],
            _ => result
                .participants()
                .into_iter()
                .map(|user| (user.clone(), self.rewards.participation_reward, "match tied"))
                .collect(),
        }
    }

    /// Debit the forfeit penalty from a stalling actor, once per match.
    pub async fn penalize(
        &self,
        match_id: &MatchId,
        user: &UserId,
    ) -> Result<PenaltyReport, SettlementError> {
        if self.rewards.forfeit_penalty <= 0 {
            return Ok(PenaltyReport {
                user: user.clone(),
                receipt: None,
                already_settled: false,
            });
        }

        let key = PostingKey::for_match(match_id, user, FORFEIT_REASON);
        let Some(receipt) = self
            .ledger
            .debit_once(&key, user, self.rewards.forfeit_penalty, FORFEIT_REASON)
            .await?
        else {
            return Ok(PenaltyReport {
                user: user.clone(),
                receipt: None,
                already_settled: true,
            });
        };
        if !receipt.is_full() {
            tracing::warn!(
                match_id = %match_id,
                user = %user,
                requested = receipt.requested,
                debited = receipt.debited,
                "forfeit penalty clamped to available balance"
            );
        }
        Ok(PenaltyReport {
            user: user.clone(),
            receipt: Some(receipt),
            already_settled: false,
        })
    }
}
