//! The `await_choice` primitive.
//!
//! A prompt is published to the sink, then responses are read until one comes
//! from the designated actor with a key from the offered set. The deadline is
//! fixed when the caller builds it; neither foreign actors nor invalid picks
//! move it.

use super::prompt::{ActorResponse, DecisionStage, Prompt};
use super::sink::{MatchEvent, MatchSink};
use crate::domain::{MatchId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("{actor} did not answer the {stage} prompt in time")]
    Timeout { actor: UserId, stage: DecisionStage },
    #[error("match cancelled")]
    Cancelled,
    #[error("response stream closed")]
    Disconnected,
}

/// Source of actor responses for one match.
#[async_trait]
pub trait ResponseStream: Send + Sync {
    /// Next response, or `None` once the stream is closed.
    async fn next_response(&mut self, prompt: &Prompt) -> Option<ActorResponse>;
}

/// Responses forwarded over a channel by the command router.
#[derive(Debug)]
pub struct ChannelResponses {
    rx: mpsc::Receiver<ActorResponse>,
}

impl ChannelResponses {
    pub fn new(rx: mpsc::Receiver<ActorResponse>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl ResponseStream for ChannelResponses {
    async fn next_response(&mut self, _prompt: &Prompt) -> Option<ActorResponse> {
        self.rx.recv().await
    }
}

/// Everything a match task needs to talk to the outside world.
pub struct MatchIo {
    pub responses: Box<dyn ResponseStream>,
    pub sink: Arc<dyn MatchSink>,
    pub cancel: watch::Receiver<bool>,
}

impl MatchIo {
    pub fn new(
        responses: Box<dyn ResponseStream>,
        sink: Arc<dyn MatchSink>,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        Self {
            responses,
            sink,
            cancel,
        }
    }
}

pub struct ChoiceGateway {
    match_id: MatchId,
    io: MatchIo,
}

impl ChoiceGateway {
    pub fn new(match_id: MatchId, io: MatchIo) -> Self {
        Self { match_id, io }
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub async fn emit(&self, event: MatchEvent) {
        self.io.sink.emit(&self.match_id, event).await;
    }

    pub async fn notify(&self, to: Option<&UserId>, message: impl Into<String>) {
        self.emit(MatchEvent::Notice {
            to: to.cloned(),
            message: message.into(),
        })
        .await;
    }

    pub fn is_cancelled(&self) -> bool {
        *self.io.cancel.borrow()
    }

    /// Publish `prompt` and wait for a valid pick from its actor until `deadline`.
    pub async fn await_choice(
        &mut self,
        mut prompt: Prompt,
        deadline: Instant,
    ) -> Result<String, DecisionError> {
        if self.is_cancelled() {
            return Err(DecisionError::Cancelled);
        }
        prompt.window_secs = deadline
            .saturating_duration_since(Instant::now())
            .as_secs();
        self.emit(MatchEvent::Prompt(prompt.clone())).await;
        tracing::debug!(
            match_id = %self.match_id,
            actor = %prompt.actor,
            stage = %prompt.stage,
            "awaiting choice"
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = wait_cancelled(&mut self.io.cancel) => return Err(DecisionError::Cancelled),
                next = tokio::time::timeout_at(deadline, self.io.responses.next_response(&prompt)) => next,
            };

            let response = match next {
                Err(_) => {
                    tracing::info!(
                        match_id = %self.match_id,
                        actor = %prompt.actor,
                        stage = %prompt.stage,
                        "decision window expired"
                    );
                    return Err(DecisionError::Timeout {
                        actor: prompt.actor.clone(),
                        stage: prompt.stage,
                    });
                }
                Ok(None) => return Err(DecisionError::Disconnected),
                Ok(Some(response)) => response,
            };

            if response.actor != prompt.actor {
                tracing::warn!(
                    match_id = %self.match_id,
                    user = %response.actor,
                    stage = %prompt.stage,
                    "ignoring response from unauthorized actor"
                );
                self.notify(
                    Some(&response.actor),
                    format!("It's not your turn: waiting on {}", prompt.actor),
                )
                .await;
                continue;
            }

            if !prompt.accepts(&response.choice) {
                tracing::warn!(
                    match_id = %self.match_id,
                    user = %response.actor,
                    stage = %prompt.stage,
                    choice = %response.choice,
                    "invalid selection"
                );
                self.notify(
                    Some(&response.actor),
                    format!("'{}' is not a valid option, pick again", response.choice),
                )
                .await;
                continue;
            }

            return Ok(response.choice);
        }
    }
}

// Resolves once the flag is raised. A dropped sender means nobody can cancel.
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        let raised = *rx.borrow_and_update();
        if raised {
            return;
        }
        if rx.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}
