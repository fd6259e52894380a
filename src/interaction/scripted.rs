//! Responders that answer prompts without a human: demo matches and tests.

use super::gateway::ResponseStream;
use super::prompt::{ActorResponse, DecisionStage, Prompt};
use crate::domain::{PlayerId, ShotType, TossChoice, UserId};
use async_trait::async_trait;
use std::collections::VecDeque;

/// Answers every prompt as its designated actor.
///
/// Picks the first offered option, except for shots (cycled from a plan),
/// preferred bowlers and the toss decision. A configured stall never answers.
#[derive(Debug, Clone)]
pub struct AutoPilot {
    shots: Vec<ShotType>,
    next_shot: usize,
    bowlers: Vec<PlayerId>,
    toss_choice: TossChoice,
    stall: Option<(DecisionStage, UserId)>,
}

impl Default for AutoPilot {
    fn default() -> Self {
        Self {
            shots: vec![ShotType::Drive],
            next_shot: 0,
            bowlers: Vec::new(),
            toss_choice: TossChoice::Bat,
            stall: None,
        }
    }
}

impl AutoPilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shots(mut self, shots: Vec<ShotType>) -> Self {
        if !shots.is_empty() {
            self.shots = shots;
        }
        self
    }

    /// Bowl these players whenever one of them is offered, in order.
    pub fn with_bowlers(mut self, bowlers: Vec<PlayerId>) -> Self {
        self.bowlers = bowlers;
        self
    }

    pub fn with_toss_choice(mut self, choice: TossChoice) -> Self {
        self.toss_choice = choice;
        self
    }

    /// Go silent the first time `actor` is asked for `stage`.
    pub fn stall_on(mut self, stage: DecisionStage, actor: UserId) -> Self {
        self.stall = Some((stage, actor));
        self
    }

    fn choose(&mut self, prompt: &Prompt) -> Option<String> {
        match prompt.stage {
            DecisionStage::Shot => {
                let shot = self.shots[self.next_shot % self.shots.len()];
                self.next_shot += 1;
                Some(shot.key().to_string())
            }
            DecisionStage::TossDecision => Some(self.toss_choice.key().to_string()),
            DecisionStage::Bowler => self
                .bowlers
                .iter()
                .find_map(|id| prompt.options.iter().find(|o| o.key == id.as_str()))
                .or_else(|| prompt.options.first())
                .map(|o| o.key.clone()),
            _ => prompt.options.first().map(|o| o.key.clone()),
        }
    }
}

#[async_trait]
impl ResponseStream for AutoPilot {
    async fn next_response(&mut self, prompt: &Prompt) -> Option<ActorResponse> {
        if let Some((stage, actor)) = &self.stall {
            if *stage == prompt.stage && *actor == prompt.actor {
                futures::future::pending::<()>().await;
            }
        }
        match self.choose(prompt) {
            Some(choice) => Some(ActorResponse::new(prompt.actor.clone(), choice)),
            None => futures::future::pending().await,
        }
    }
}

/// Replays a fixed queue of responses, then goes silent.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponses {
    queue: VecDeque<ActorResponse>,
}

impl ScriptedResponses {
    pub fn new(responses: impl IntoIterator<Item = ActorResponse>) -> Self {
        Self {
            queue: responses.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ResponseStream for ScriptedResponses {
    async fn next_response(&mut self, _prompt: &Prompt) -> Option<ActorResponse> {
        match self.queue.pop_front() {
            Some(response) => Some(response),
            None => futures::future::pending().await,
        }
    }
}
