//! Prompt vocabulary shared by the gateway, the sinks and the responders.

use crate::domain::UserId;
use serde::{Deserialize, Serialize};

/// Which decision a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStage {
    TossCall,
    TossDecision,
    Opener,
    NewBatsman,
    Bowler,
    PaceType,
    Length,
    SpinDelivery,
    Shot,
}

impl DecisionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStage::TossCall => "toss_call",
            DecisionStage::TossDecision => "toss_decision",
            DecisionStage::Opener => "opener",
            DecisionStage::NewBatsman => "new_batsman",
            DecisionStage::Bowler => "bowler",
            DecisionStage::PaceType => "pace_type",
            DecisionStage::Length => "length",
            DecisionStage::SpinDelivery => "spin_delivery",
            DecisionStage::Shot => "shot",
        }
    }
}

impl std::fmt::Display for DecisionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Value the actor sends back.
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ChoiceOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A choice offered to exactly one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub stage: DecisionStage,
    pub actor: UserId,
    pub title: String,
    pub options: Vec<ChoiceOption>,
    /// Seconds left on the clock when the prompt was issued.
    pub window_secs: u64,
}

impl Prompt {
    pub fn accepts(&self, choice: &str) -> bool {
        self.options.iter().any(|o| o.key == choice)
    }
}

/// A pick forwarded from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorResponse {
    pub actor: UserId,
    pub choice: String,
}

impl ActorResponse {
    pub fn new(actor: UserId, choice: impl Into<String>) -> Self {
        Self {
            actor,
            choice: choice.into(),
        }
    }
}
