//! Per-innings batting and bowling figures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Legal balls in an over.
pub const BALLS_PER_OVER: u32 = 6;

/// Individual score thresholds that trigger a celebration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Milestone {
    #[serde(rename = "50")]
    Fifty,
    #[serde(rename = "100")]
    Century,
}

impl Milestone {
    pub const ALL: [Milestone; 2] = [Milestone::Fifty, Milestone::Century];

    pub fn threshold(&self) -> u32 {
        match self {
            Milestone::Fifty => 50,
            Milestone::Century => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Milestone::Fifty => "FIFTY",
            Milestone::Century => "CENTURY",
        }
    }
}

/// Ball count rendered in cricket notation (`overs.balls`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Overs {
    pub balls: u32,
}

impl Overs {
    pub fn from_balls(balls: u32) -> Self {
        Overs { balls }
    }

    pub fn completed(&self) -> u32 {
        self.balls / BALLS_PER_OVER
    }

    pub fn remainder(&self) -> u32 {
        self.balls % BALLS_PER_OVER
    }

    /// Overs as a decimal fraction of six balls, used for rate arithmetic.
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.balls) / f64::from(BALLS_PER_OVER)
    }
}

impl std::fmt::Display for Overs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.completed(), self.remainder())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatsmanFigures {
    pub runs: u32,
    pub balls_faced: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dots: u32,
    pub milestones_reached: BTreeSet<Milestone>,
}

impl BatsmanFigures {
    /// Runs per hundred balls; zero before the first ball.
    pub fn strike_rate(&self) -> f64 {
        if self.balls_faced == 0 {
            return 0.0;
        }
        f64::from(self.runs) / f64::from(self.balls_faced) * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlerFigures {
    pub balls_bowled: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
}

impl BowlerFigures {
    pub fn overs(&self) -> Overs {
        Overs::from_balls(self.balls_bowled)
    }

    /// Runs conceded per six legal balls.
    pub fn economy(&self) -> f64 {
        if self.balls_bowled == 0 {
            return 0.0;
        }
        f64::from(self.runs_conceded) * f64::from(BALLS_PER_OVER) / f64::from(self.balls_bowled)
    }
}
