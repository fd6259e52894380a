//! Immutable per-match configuration and the fixed condition catalogues.

use super::figures::BALLS_PER_OVER;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const MIN_OVERS: u32 = 1;
pub const MAX_OVERS: u32 = 50;

pub const VENUES: &[&str] = &[
    "Lord's, London",
    "Eden Gardens, Kolkata",
    "MCG, Melbourne",
    "Wanderers, Johannesburg",
    "Seddon Park, Hamilton",
    "Gaddafi Stadium, Lahore",
    "Pallekele, Kandy",
    "Kensington Oval, Barbados",
    "Dubai International, Dubai",
    "Wankhede Stadium, Mumbai",
];

pub const WEATHER_CONDITIONS: &[&str] = &["Sunny", "Partly Cloudy", "Overcast", "Humid", "Windy"];

pub const PITCH_CONDITIONS: &[&str] = &["Grassy", "Dry", "Flat", "Two-paced"];

pub const UMPIRES: &[&str] = &[
    "Chris Gaffaney",
    "Kumar Dharmasena",
    "Aleem Dar",
    "Richard Illingworth",
    "Marais Erasmus",
    "Paul Reiffel",
    "Joel Wilson",
    "Rod Tucker",
    "Richard Kettleborough",
    "Nitin Menon",
    "Adrian Holdstock",
];

/// Whether the delivery is shown to the batting side before the shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    pub fn reveals_delivery(&self) -> bool {
        matches!(self, Difficulty::Easy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchFormat {
    T10,
    T20,
    #[serde(rename = "ODI")]
    Odi,
}

impl MatchFormat {
    pub fn for_overs(overs: u32) -> Self {
        match overs {
            0..=10 => MatchFormat::T10,
            11..=20 => MatchFormat::T20,
            _ => MatchFormat::Odi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchFormat::T10 => "T10",
            MatchFormat::T20 => "T20",
            MatchFormat::Odi => "ODI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchConfigError {
    #[error("overs must be between 1 and 50, got {0}")]
    OversOutOfRange(u32),
}

/// Created once at match start and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub overs_per_innings: u32,
    pub venue: String,
    pub weather: String,
    pub pitch: String,
    pub umpire: String,
    pub difficulty: Difficulty,
}

impl MatchConfig {
    pub fn new(
        overs_per_innings: u32,
        venue: impl Into<String>,
        weather: impl Into<String>,
        pitch: impl Into<String>,
        umpire: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, MatchConfigError> {
        validate_overs(overs_per_innings)?;
        Ok(MatchConfig {
            overs_per_innings,
            venue: venue.into(),
            weather: weather.into(),
            pitch: pitch.into(),
            umpire: umpire.into(),
            difficulty,
        })
    }

    /// Config with the first entry of every catalogue. Handy for tests.
    pub fn with_defaults(
        overs_per_innings: u32,
        difficulty: Difficulty,
    ) -> Result<Self, MatchConfigError> {
        Self::new(
            overs_per_innings,
            VENUES[0],
            WEATHER_CONDITIONS[0],
            PITCH_CONDITIONS[0],
            UMPIRES[0],
            difficulty,
        )
    }

    pub fn max_balls(&self) -> u32 {
        self.overs_per_innings * BALLS_PER_OVER
    }

    pub fn format(&self) -> MatchFormat {
        MatchFormat::for_overs(self.overs_per_innings)
    }
}

pub fn validate_overs(overs: u32) -> Result<(), MatchConfigError> {
    if (MIN_OVERS..=MAX_OVERS).contains(&overs) {
        Ok(())
    } else {
        Err(MatchConfigError::OversOutOfRange(overs))
    }
}
