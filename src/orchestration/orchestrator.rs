//! Match Orchestrator: toss, two innings, result, settlement.

use super::coordinator::{InteractionCoordinator, Interrupt, PromptTimeouts};
use super::innings::InningsMachine;
use super::settlement::{PenaltyReport, SettlementReport, Settler};
use crate::domain::{MatchConfig, MatchId, MatchResult, PlayingXi, UserId};
use crate::engine::{InningsSetup, RandomSource};
use crate::interaction::{DecisionStage, MatchEvent, MatchIo};
use crate::records::MatchRecord;
use crate::roster::PlayerStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything fixed before the first prompt.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub match_id: MatchId,
    pub config: MatchConfig,
    pub creator: UserId,
    pub opponent: UserId,
    pub creator_xi: PlayingXi,
    pub opponent_xi: PlayingXi,
    pub creator_label: String,
    pub opponent_label: String,
}

impl MatchSetup {
    fn side(&self, user: &UserId) -> (&PlayingXi, &str) {
        if *user == self.creator {
            (&self.creator_xi, &self.creator_label)
        } else {
            (&self.opponent_xi, &self.opponent_label)
        }
    }
}

/// Terminal state of a match. Exactly one is produced per match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Completed {
        result: MatchResult,
        /// `None` when settlement failed; the result still stands.
        settlement: Option<SettlementReport>,
    },
    Forfeited {
        forfeited_by: UserId,
        stage: DecisionStage,
        penalty: Option<PenaltyReport>,
    },
    Cancelled,
    Aborted {
        reason: String,
    },
}

impl MatchOutcome {
    /// Final notification text for both participants.
    pub fn message(&self) -> String {
        match self {
            MatchOutcome::Completed { result, .. } => result.summary_line(),
            MatchOutcome::Forfeited {
                forfeited_by,
                stage,
                penalty,
            } => {
                let debited = penalty
                    .as_ref()
                    .and_then(|p| p.receipt)
                    .map(|r| r.debited)
                    .unwrap_or(0);
                format!(
                    "{} did not respond at the {} prompt and forfeits the match ({} coins penalty)",
                    forfeited_by, stage, debited
                )
            }
            MatchOutcome::Cancelled => "Match cancelled by its creator. No result.".to_string(),
            MatchOutcome::Aborted { reason } => {
                format!("Match stopped due to an internal error: {}. No result.", reason)
            }
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            MatchOutcome::Completed { .. } => "completed",
            MatchOutcome::Forfeited { .. } => "forfeited",
            MatchOutcome::Cancelled => "cancelled",
            MatchOutcome::Aborted { .. } => "aborted",
        }
    }
}

#[derive(Clone)]
pub struct MatchOrchestrator {
    store: Arc<dyn PlayerStore>,
    settler: Settler,
    timeouts: PromptTimeouts,
}

impl MatchOrchestrator {
    pub fn new(store: Arc<dyn PlayerStore>, settler: Settler, timeouts: PromptTimeouts) -> Self {
        Self {
            store,
            settler,
            timeouts,
        }
    }

    pub fn store(&self) -> Arc<dyn PlayerStore> {
        self.store.clone()
    }

    /// Play a match to its terminal outcome. Never fails: every interruption
    /// becomes a `MatchOutcome`, announced once as the final event.
    pub async fn play_match(
        &self,
        setup: MatchSetup,
        io: MatchIo,
        rng: Box<dyn RandomSource>,
    ) -> MatchOutcome {
        let mut coordinator = InteractionCoordinator::new(
            setup.match_id.clone(),
            setup.config.clone(),
            self.store.clone(),
            io,
            rng,
            self.timeouts,
        );
        tracing::info!(
            match_id = %setup.match_id,
            creator = %setup.creator,
            opponent = %setup.opponent,
            overs = setup.config.overs_per_innings,
            venue = %setup.config.venue,
            "match started"
        );

        let outcome = match Self::contest(&setup, &mut coordinator).await {
            Ok(result) => self.finish(&setup, result).await,
            Err(Interrupt::Forfeit(stall)) => {
                let penalty = match self.settler.penalize(&setup.match_id, &stall.actor).await {
                    Ok(report) => Some(report),
                    Err(e) => {
                        tracing::error!(match_id = %setup.match_id, error = %e, "forfeit penalty failed");
                        None
                    }
                };
                tracing::info!(
                    match_id = %setup.match_id,
                    user = %stall.actor,
                    stage = %stall.stage,
                    "match forfeited"
                );
                MatchOutcome::Forfeited {
                    forfeited_by: stall.actor,
                    stage: stall.stage,
                    penalty,
                }
            }
            Err(Interrupt::Cancelled) => {
                tracing::info!(match_id = %setup.match_id, "match cancelled");
                MatchOutcome::Cancelled
            }
            Err(Interrupt::Internal(reason)) => {
                tracing::error!(match_id = %setup.match_id, reason = %reason, "match aborted");
                MatchOutcome::Aborted { reason }
            }
        };

        coordinator
            .emit(MatchEvent::Finished(Box::new(outcome.clone())))
            .await;
        outcome
    }

    async fn contest(
        setup: &MatchSetup,
        coordinator: &mut InteractionCoordinator,
    ) -> Result<MatchResult, Interrupt> {
        // The invited side calls the toss.
        let toss = coordinator.toss(&setup.opponent, &setup.creator).await?;
        let max_balls = setup.config.max_balls();

        let (bat_xi, bat_label) = setup.side(&toss.batting_first);
        let (bowl_xi, _) = setup.side(&toss.bowling_first);
        let first = InningsMachine::run(
            coordinator,
            InningsSetup {
                number: 1,
                batting_user: toss.batting_first.clone(),
                bowling_user: toss.bowling_first.clone(),
                batting_xi: bat_xi.as_slice().to_vec(),
                bowling_xi: bowl_xi.as_slice().to_vec(),
                max_balls,
                target: None,
            },
            bat_label.to_string(),
        )
        .await?;

        let target = first.score.runs + 1;
        let (bat_xi, bat_label) = setup.side(&toss.bowling_first);
        let (bowl_xi, _) = setup.side(&toss.batting_first);
        let second = InningsMachine::run(
            coordinator,
            InningsSetup {
                number: 2,
                batting_user: toss.bowling_first.clone(),
                bowling_user: toss.batting_first.clone(),
                batting_xi: bat_xi.as_slice().to_vec(),
                bowling_xi: bowl_xi.as_slice().to_vec(),
                max_balls,
                target: Some(target),
            },
            bat_label.to_string(),
        )
        .await?;

        Ok(MatchResult::decide(
            setup.match_id.clone(),
            first.score,
            second.score,
        ))
    }

    async fn finish(&self, setup: &MatchSetup, result: MatchResult) -> MatchOutcome {
        tracing::info!(
            match_id = %setup.match_id,
            winner = ?result.winner,
            margin = %result.margin.description(),
            "match complete"
        );
        let record = MatchRecord {
            result: result.clone(),
            venue: setup.config.venue.clone(),
            overs: setup.config.overs_per_innings,
            format: setup.config.format(),
            difficulty: setup.config.difficulty,
            finished_at: Utc::now(),
        };
        let settlement = match self.settler.settle(&record).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(match_id = %setup.match_id, error = %e, "settlement failed");
                None
            }
        };
        MatchOutcome::Completed { result, settlement }
    }
}
