//! Presentation seam: everything a match shows its participants.

use super::prompt::Prompt;
use crate::domain::{BallRecord, CoinFace, MatchId, Milestone, PlayerId, TossChoice, UserId};
use crate::engine::{InningsSummary, LiveSnapshot, WicketCard};
use crate::orchestration::MatchOutcome;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MatchEvent {
    Prompt(Prompt),
    Notice {
        to: Option<UserId>,
        message: String,
    },
    TossResult {
        caller: UserId,
        call: CoinFace,
        landed: CoinFace,
        winner: UserId,
        decision: TossChoice,
    },
    InningsStarted {
        number: u8,
        batting_user: UserId,
        bowling_user: UserId,
        batting_label: String,
        target: Option<u32>,
    },
    BallResult(BallRecord),
    Live(Box<LiveSnapshot>),
    Wicket(Box<WicketCard>),
    Milestone {
        batsman: PlayerId,
        name: String,
        milestone: Milestone,
        runs: u32,
        balls: u32,
    },
    OverCompleted {
        /// One-based over number.
        over: u32,
        runs: u32,
        bowler: PlayerId,
    },
    InningsComplete(Box<InningsSummary>),
    Finished(Box<MatchOutcome>),
}

/// Receives match events in order. Implementations must not fail the match.
#[async_trait]
pub trait MatchSink: Send + Sync {
    async fn emit(&self, match_id: &MatchId, event: MatchEvent);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencedEvent {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub event: MatchEvent,
}

/// In-memory per-match event log, read by the HTTP feed.
#[derive(Debug, Default)]
pub struct EventFeed {
    logs: RwLock<HashMap<MatchId, Vec<SequencedEvent>>>,
}

impl EventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events with `seq >= since`, oldest first. `None` for an unknown match.
    pub async fn events_since(&self, match_id: &MatchId, since: u64) -> Option<Vec<SequencedEvent>> {
        let logs = self.logs.read().await;
        let log = logs.get(match_id)?;
        Some(log.iter().filter(|e| e.seq >= since).cloned().collect())
    }

    pub async fn all(&self, match_id: &MatchId) -> Vec<MatchEvent> {
        let logs = self.logs.read().await;
        logs.get(match_id)
            .map(|log| log.iter().map(|e| e.event.clone()).collect())
            .unwrap_or_default()
    }

    /// Create an empty log so feeds resolve before the first event lands.
    pub async fn open(&self, match_id: &MatchId) {
        let mut logs = self.logs.write().await;
        logs.entry(match_id.clone()).or_default();
    }

    /// Drop a match's log. Later reads see an unknown match.
    pub async fn close(&self, match_id: &MatchId) {
        self.logs.write().await.remove(match_id);
    }

    pub async fn len(&self) -> usize {
        self.logs.read().await.len()
    }
}

#[async_trait]
impl MatchSink for EventFeed {
    async fn emit(&self, match_id: &MatchId, event: MatchEvent) {
        let mut logs = self.logs.write().await;
        let log = logs.entry(match_id.clone()).or_default();
        let seq = log.len() as u64;
        log.push(SequencedEvent {
            seq,
            at: Utc::now(),
            event,
        });
    }
}
