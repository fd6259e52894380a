//! Toss vocabulary.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    pub fn from_flip(heads: bool) -> Self {
        if heads {
            CoinFace::Heads
        } else {
            CoinFace::Tails
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            CoinFace::Heads => "heads",
            CoinFace::Tails => "tails",
        }
    }
}

impl FromStr for CoinFace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heads" => Ok(CoinFace::Heads),
            "tails" => Ok(CoinFace::Tails),
            other => Err(format!("unknown coin face: {}", other)),
        }
    }
}

/// What the toss winner elects to do first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossChoice {
    Bat,
    Bowl,
}

impl TossChoice {
    pub fn key(&self) -> &'static str {
        match self {
            TossChoice::Bat => "bat",
            TossChoice::Bowl => "bowl",
        }
    }
}

impl FromStr for TossChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bat" => Ok(TossChoice::Bat),
            "bowl" => Ok(TossChoice::Bowl),
            other => Err(format!("unknown toss choice: {}", other)),
        }
    }
}
