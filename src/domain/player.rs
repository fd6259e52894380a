//! Players, roles, bowler specialties and the playing XI.

use super::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

/// Number of players in a playing XI.
pub const XI_SIZE: usize = 11;

/// Playing role of a catalogue player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Batsman,
    Bowler,
    AllRounder,
    WicketKeeper,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Batsman => "batsman",
            Role::Bowler => "bowler",
            Role::AllRounder => "all_rounder",
            Role::WicketKeeper => "wicket_keeper",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batsman" => Ok(Role::Batsman),
            "bowler" => Ok(Role::Bowler),
            "all_rounder" | "allrounder" => Ok(Role::AllRounder),
            "wicket_keeper" | "wicketkeeper" => Ok(Role::WicketKeeper),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Coarse bowling style recorded in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BowlingStyle {
    Pace,
    Spin,
}

impl FromStr for BowlingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pace" | "fast" => Ok(BowlingStyle::Pace),
            "spin" => Ok(BowlingStyle::Spin),
            other => Err(format!("unknown bowling style: {}", other)),
        }
    }
}

/// Delivery menu a bowler chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BowlerSpecialty {
    /// Two-stage choice: pace type, then length.
    Fast,
    OffSpin,
    LegSpin,
}

const OFF_SPIN_NAMES: &[&str] = &["ashwin", "lyon", "moeen", "jadeja"];
const LEG_SPIN_NAMES: &[&str] = &["kuldeep", "chahal", "rashid", "zampa", "adil"];

/// Immutable catalogue entry. Never mutated during a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    /// Batting rating, 0-100.
    pub batting: u8,
    /// Bowling rating, 0-100.
    pub bowling: u8,
    pub country: String,
    pub bowling_style: Option<BowlingStyle>,
}

impl Player {
    /// Role-weighted overall rating, rounded to one decimal.
    pub fn overall(&self) -> f64 {
        let bat = f64::from(self.batting);
        let bowl = f64::from(self.bowling);
        let ovr = match self.role {
            Role::Batsman => bat * 0.80 + bowl * 0.20,
            Role::Bowler => bat * 0.20 + bowl * 0.80,
            Role::AllRounder => bat * 0.50 + bowl * 0.50,
            Role::WicketKeeper => bat * 0.75 + bowl * 0.25,
        };
        (ovr * 10.0).round() / 10.0
    }

    /// Classify which delivery menu this bowler gets.
    ///
    /// Known spinners are recognised by name first, then the catalogue style
    /// decides; unidentified spinners default to off-spin.
    pub fn specialty(&self) -> BowlerSpecialty {
        let name = self.name.to_ascii_lowercase();
        if OFF_SPIN_NAMES.iter().any(|n| name.contains(n)) {
            BowlerSpecialty::OffSpin
        } else if LEG_SPIN_NAMES.iter().any(|n| name.contains(n)) {
            BowlerSpecialty::LegSpin
        } else if self.bowling_style == Some(BowlingStyle::Spin) {
            BowlerSpecialty::OffSpin
        } else {
            BowlerSpecialty::Fast
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineupError {
    #[error("playing XI must have exactly 11 players, got {0}")]
    WrongSize(usize),
    #[error("player {0} appears more than once in the XI")]
    Duplicate(PlayerId),
    #[error("player {0} is not eligible for this selection")]
    NotEligible(PlayerId),
    #[error("player {0} cannot bowl consecutive overs")]
    ConsecutiveOvers(PlayerId),
    #[error("selection is out of sequence: {0}")]
    OutOfSequence(&'static str),
}

/// Ordered sequence of exactly eleven distinct player ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingXi(Vec<PlayerId>);

impl PlayingXi {
    pub fn new(players: Vec<PlayerId>) -> Result<Self, LineupError> {
        if players.len() != XI_SIZE {
            return Err(LineupError::WrongSize(players.len()));
        }
        let mut seen = HashSet::with_capacity(XI_SIZE);
        for id in &players {
            if !seen.insert(id) {
                return Err(LineupError::Duplicate(id.clone()));
            }
        }
        Ok(PlayingXi(players))
    }

    /// Build from string ids (fixed rosters, tests).
    pub fn from_ids(ids: &[&str]) -> Result<Self, LineupError> {
        Self::new(ids.iter().map(|id| PlayerId::new(*id)).collect())
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[PlayerId] {
        &self.0
    }
}
