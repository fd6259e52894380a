//! Match registry: the command router's view of running matches.
//!
//! One spawned task per match. At most one active match per channel.
//! Responses reach a match through its mpsc channel; cancellation through its
//! watch flag. The most recent finished outcomes and their event logs are
//! kept for later queries; older ones are evicted.

use super::orchestrator::{MatchOrchestrator, MatchOutcome, MatchSetup};
use crate::domain::match_config::{self, PITCH_CONDITIONS, UMPIRES, VENUES, WEATHER_CONDITIONS};
use crate::domain::{ChannelId, Coins, Difficulty, MatchConfig, MatchId, UserId};
use crate::engine::{pick, RandomSource, SeededRandom};
use crate::interaction::{
    ActorResponse, ChannelResponses, EventFeed, MatchEvent, MatchIo, MatchSink, ResponseStream,
    SequencedEvent,
};
use crate::ledger::{Ledger, LedgerError};
use crate::roster::{ensure_playable, RosterError, RosterService, FALLBACK_AWAY_XI, FALLBACK_HOME_XI};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch, RwLock};

const RESPONSE_BUFFER: usize = 64;

/// Finished matches kept queryable by default.
pub const DEFAULT_FINISHED_RETENTION: usize = 256;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("channel {0} already hosts an active match")]
    ChannelBusy(ChannelId),
    #[error("match {0} not found or already finished")]
    NotFound(MatchId),
    #[error("only the match creator can cancel it")]
    NotCreator,
    #[error("invalid match request: {0}")]
    Invalid(String),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMatch {
    pub channel_id: ChannelId,
    pub creator: UserId,
    pub opponent: UserId,
    pub overs: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Fixes the random stream; drawn from entropy when absent.
    pub seed: Option<u64>,
}

struct ActiveMatch {
    channel: ChannelId,
    creator: UserId,
    responses: mpsc::Sender<ActorResponse>,
    cancel: watch::Sender<bool>,
}

#[derive(Default)]
struct RegistryState {
    active: HashMap<MatchId, ActiveMatch>,
    channels: HashMap<ChannelId, MatchId>,
    finished: HashMap<MatchId, MatchOutcome>,
    finished_order: VecDeque<MatchId>,
}

impl RegistryState {
    /// Record an outcome. Returns the matches pushed out by the cap.
    fn finish(&mut self, match_id: MatchId, outcome: MatchOutcome, retention: usize) -> Vec<MatchId> {
        if let Some(active) = self.active.remove(&match_id) {
            self.channels.remove(&active.channel);
        }
        if self.finished.insert(match_id.clone(), outcome).is_none() {
            self.finished_order.push_back(match_id);
        }
        let mut evicted = Vec::new();
        while self.finished_order.len() > retention {
            if let Some(old) = self.finished_order.pop_front() {
                self.finished.remove(&old);
                evicted.push(old);
            }
        }
        evicted
    }
}

#[derive(Clone)]
pub struct MatchRegistry {
    state: Arc<RwLock<RegistryState>>,
    orchestrator: Arc<MatchOrchestrator>,
    roster: Arc<dyn RosterService>,
    ledger: Arc<dyn Ledger>,
    feed: Arc<EventFeed>,
    starting_balance: Coins,
    retention: usize,
}

impl MatchRegistry {
    pub fn new(
        orchestrator: Arc<MatchOrchestrator>,
        roster: Arc<dyn RosterService>,
        ledger: Arc<dyn Ledger>,
        feed: Arc<EventFeed>,
        starting_balance: Coins,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            orchestrator,
            roster,
            ledger,
            feed,
            starting_balance,
            retention: DEFAULT_FINISHED_RETENTION,
        }
    }

    /// Keep at most `retention` finished matches queryable.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub fn feed(&self) -> Arc<EventFeed> {
        self.feed.clone()
    }

    /// Start a match driven by responses posted through `respond`.
    pub async fn start(&self, request: StartMatch) -> Result<MatchId, RegistryError> {
        self.start_with(request, None).await
    }

    /// Start a match. `responder` replaces the response channel when given
    /// (demo matches, tests).
    pub async fn start_with(
        &self,
        request: StartMatch,
        responder: Option<Box<dyn ResponseStream>>,
    ) -> Result<MatchId, RegistryError> {
        if request.creator == request.opponent {
            return Err(RegistryError::Invalid(
                "creator and opponent must differ".to_string(),
            ));
        }
        match_config::validate_overs(request.overs)
            .map_err(|e| RegistryError::Invalid(e.to_string()))?;

        let match_id = MatchId::generate();
        {
            let mut state = self.state.write().await;
            if state.channels.contains_key(&request.channel_id) {
                return Err(RegistryError::ChannelBusy(request.channel_id));
            }
            state
                .channels
                .insert(request.channel_id.clone(), match_id.clone());
        }

        match self.prepare(&match_id, &request).await {
            Ok((setup, rng)) => {
                self.launch(match_id.clone(), request, setup, rng, responder)
                    .await;
                Ok(match_id)
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.channels.remove(&request.channel_id);
                Err(e)
            }
        }
    }

    async fn prepare(
        &self,
        match_id: &MatchId,
        request: &StartMatch,
    ) -> Result<(MatchSetup, SeededRandom), RegistryError> {
        let seed = request.seed.unwrap_or_else(rand::random);
        let mut rng = SeededRandom::new(seed);
        let config = draw_config(&mut rng, request.overs, request.difficulty)?;

        let store = self.orchestrator.store();
        let creator_registered = self.roster.playing_xi(&request.creator).await?;
        let opponent_registered = self.roster.playing_xi(&request.opponent).await?;
        let creator_xi = ensure_playable(
            store.as_ref(),
            creator_registered.as_deref(),
            &FALLBACK_HOME_XI,
        )?;
        let opponent_xi = ensure_playable(
            store.as_ref(),
            opponent_registered.as_deref(),
            &FALLBACK_AWAY_XI,
        )?;

        let creator_label = self.team_label(&request.creator).await?;
        let opponent_label = self.team_label(&request.opponent).await?;

        self.ledger
            .ensure_account(&request.creator, self.starting_balance)
            .await?;
        self.ledger
            .ensure_account(&request.opponent, self.starting_balance)
            .await?;

        tracing::info!(match_id = %match_id, seed, "match prepared");
        Ok((
            MatchSetup {
                match_id: match_id.clone(),
                config,
                creator: request.creator.clone(),
                opponent: request.opponent.clone(),
                creator_xi,
                opponent_xi,
                creator_label,
                opponent_label,
            },
            rng,
        ))
    }

    async fn team_label(&self, user: &UserId) -> Result<String, RegistryError> {
        Ok(self
            .roster
            .team_name(user)
            .await?
            .unwrap_or_else(|| format!("{}'s XI", user)))
    }

    async fn launch(
        &self,
        match_id: MatchId,
        request: StartMatch,
        setup: MatchSetup,
        rng: SeededRandom,
        responder: Option<Box<dyn ResponseStream>>,
    ) {
        let (tx, rx) = mpsc::channel(RESPONSE_BUFFER);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let responses: Box<dyn ResponseStream> = match responder {
            Some(stream) => stream,
            None => Box::new(ChannelResponses::new(rx)),
        };
        self.feed.open(&match_id).await;
        let io = MatchIo::new(responses, self.feed.clone(), cancel_rx);

        {
            let mut state = self.state.write().await;
            state.active.insert(
                match_id.clone(),
                ActiveMatch {
                    channel: request.channel_id,
                    creator: request.creator,
                    responses: tx,
                    cancel: cancel_tx,
                },
            );
        }

        let orchestrator = self.orchestrator.clone();
        let play = tokio::spawn(async move {
            orchestrator
                .play_match(setup, io, Box::new(rng) as Box<dyn RandomSource>)
                .await
        });

        let state = self.state.clone();
        let feed = self.feed.clone();
        let retention = self.retention;
        tokio::spawn(async move {
            let outcome = match play.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(match_id = %match_id, error = %e, "match task failed");
                    let outcome = MatchOutcome::Aborted {
                        reason: "match task failed".to_string(),
                    };
                    feed.emit(&match_id, MatchEvent::Finished(Box::new(outcome.clone())))
                        .await;
                    outcome
                }
            };
            let evicted = state.write().await.finish(match_id, outcome, retention);
            for old in evicted {
                feed.close(&old).await;
                tracing::debug!(match_id = %old, "finished match evicted");
            }
        });
    }

    /// Forward a pick to a running match.
    pub async fn respond(
        &self,
        match_id: &MatchId,
        response: ActorResponse,
    ) -> Result<(), RegistryError> {
        let sender = {
            let state = self.state.read().await;
            state
                .active
                .get(match_id)
                .map(|m| m.responses.clone())
                .ok_or_else(|| RegistryError::NotFound(match_id.clone()))?
        };
        sender
            .send(response)
            .await
            .map_err(|_| RegistryError::NotFound(match_id.clone()))
    }

    /// Creator-only cancellation. Takes effect at the next suspension point.
    pub async fn cancel(&self, match_id: &MatchId, requester: &UserId) -> Result<(), RegistryError> {
        let state = self.state.read().await;
        let active = state
            .active
            .get(match_id)
            .ok_or_else(|| RegistryError::NotFound(match_id.clone()))?;
        if active.creator != *requester {
            tracing::warn!(match_id = %match_id, user = %requester, "cancel refused: not creator");
            return Err(RegistryError::NotCreator);
        }
        active
            .cancel
            .send(true)
            .map_err(|_| RegistryError::NotFound(match_id.clone()))?;
        tracing::info!(match_id = %match_id, user = %requester, "cancel requested");
        Ok(())
    }

    pub async fn active_count(&self) -> usize {
        self.state.read().await.active.len()
    }

    pub async fn is_active(&self, match_id: &MatchId) -> bool {
        self.state.read().await.active.contains_key(match_id)
    }

    pub async fn active_in(&self, channel: &ChannelId) -> Option<MatchId> {
        self.state.read().await.channels.get(channel).cloned()
    }

    pub async fn outcome(&self, match_id: &MatchId) -> Option<MatchOutcome> {
        self.state.read().await.finished.get(match_id).cloned()
    }

    pub async fn finished_count(&self) -> usize {
        self.state.read().await.finished.len()
    }

    pub async fn events(&self, match_id: &MatchId, since: u64) -> Option<Vec<SequencedEvent>> {
        self.feed.events_since(match_id, since).await
    }

    /// Poll until the match finishes or `timeout` elapses.
    pub async fn wait_for_outcome(
        &self,
        match_id: &MatchId,
        timeout: Duration,
    ) -> Option<MatchOutcome> {
        let poll = async {
            loop {
                if let Some(outcome) = self.outcome(match_id).await {
                    return Some(outcome);
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.ok().flatten()
    }
}

fn draw_config(
    rng: &mut dyn RandomSource,
    overs: u32,
    difficulty: Difficulty,
) -> Result<MatchConfig, RegistryError> {
    let mut draw = |items: &[&'static str]| pick(&mut *rng, items).copied().unwrap_or_default();
    let venue = draw(VENUES);
    let weather = draw(WEATHER_CONDITIONS);
    let pitch = draw(PITCH_CONDITIONS);
    let umpire = draw(UMPIRES);
    MatchConfig::new(overs, venue, weather, pitch, umpire, difficulty)
        .map_err(|e| RegistryError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_evicts_oldest_beyond_retention() {
        let mut state = RegistryState::default();
        assert!(state.finish(MatchId::new("m0"), MatchOutcome::Cancelled, 2).is_empty());
        assert!(state.finish(MatchId::new("m1"), MatchOutcome::Cancelled, 2).is_empty());
        // Finishing the same match twice does not take a second slot.
        assert!(state.finish(MatchId::new("m1"), MatchOutcome::Cancelled, 2).is_empty());

        let evicted = state.finish(MatchId::new("m2"), MatchOutcome::Cancelled, 2);
        assert_eq!(evicted, vec![MatchId::new("m0")]);
        assert!(!state.finished.contains_key(&MatchId::new("m0")));
        assert_eq!(state.finished.len(), 2);
        assert_eq!(state.finished_order.len(), 2);
    }

    #[test]
    fn test_finish_frees_the_channel() {
        let mut state = RegistryState::default();
        let (responses, _rx) = mpsc::channel(1);
        let (cancel, _cancel_rx) = watch::channel(false);
        let id = MatchId::new("m0");
        let channel = ChannelId::new("lobby");
        state.channels.insert(channel.clone(), id.clone());
        state.active.insert(
            id.clone(),
            ActiveMatch {
                channel: channel.clone(),
                creator: UserId::new("alice"),
                responses,
                cancel,
            },
        );

        state.finish(id.clone(), MatchOutcome::Cancelled, 8);
        assert!(state.active.is_empty());
        assert!(!state.channels.contains_key(&channel));
        assert_eq!(state.finished.get(&id), Some(&MatchOutcome::Cancelled));
    }
}
