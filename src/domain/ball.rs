//! Ball vocabulary: shots, deliveries, outcomes, dismissals and the ball record.

use super::{BowlerSpecialty, PlayerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The eight shots offered to the batting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotType {
    Drive,
    Loft,
    Defend,
    Sweep,
    Cut,
    Leave,
    Pull,
    Flick,
}

impl ShotType {
    pub const ALL: [ShotType; 8] = [
        ShotType::Drive,
        ShotType::Loft,
        ShotType::Defend,
        ShotType::Sweep,
        ShotType::Cut,
        ShotType::Leave,
        ShotType::Pull,
        ShotType::Flick,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ShotType::Drive => "drive",
            ShotType::Loft => "loft",
            ShotType::Defend => "defend",
            ShotType::Sweep => "sweep",
            ShotType::Cut => "cut",
            ShotType::Leave => "leave",
            ShotType::Pull => "pull",
            ShotType::Flick => "flick",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShotType::Drive => "Drive",
            ShotType::Loft => "Loft",
            ShotType::Defend => "Defend",
            ShotType::Sweep => "Sweep",
            ShotType::Cut => "Cut",
            ShotType::Leave => "Leave",
            ShotType::Pull => "Pull",
            ShotType::Flick => "Flick",
        }
    }
}

impl FromStr for ShotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShotType::ALL
            .into_iter()
            .find(|shot| shot.key() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown shot: {}", s))
    }
}

/// First stage of a fast bowler's delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceType {
    Quick,
    Outswing,
    Inswing,
    ReverseSwing,
    Slow,
}

impl PaceType {
    pub const ALL: [PaceType; 5] = [
        PaceType::Quick,
        PaceType::Outswing,
        PaceType::Inswing,
        PaceType::ReverseSwing,
        PaceType::Slow,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PaceType::Quick => "quick",
            PaceType::Outswing => "outswing",
            PaceType::Inswing => "inswing",
            PaceType::ReverseSwing => "reverse_swing",
            PaceType::Slow => "slow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaceType::Quick => "Quick",
            PaceType::Outswing => "Outswing",
            PaceType::Inswing => "Inswing",
            PaceType::ReverseSwing => "Reverse Swing",
            PaceType::Slow => "Slow",
        }
    }
}

impl FromStr for PaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaceType::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| format!("unknown pace type: {}", s))
    }
}

/// Second stage of a fast bowler's delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    GoodLength,
    Full,
    Yorker,
    Bouncer,
    FullToss,
}

impl Length {
    pub const ALL: [Length; 5] = [
        Length::GoodLength,
        Length::Full,
        Length::Yorker,
        Length::Bouncer,
        Length::FullToss,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Length::GoodLength => "good_length",
            Length::Full => "full",
            Length::Yorker => "yorker",
            Length::Bouncer => "bouncer",
            Length::FullToss => "full_toss",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Length::GoodLength => "Good Length",
            Length::Full => "Full",
            Length::Yorker => "Yorker",
            Length::Bouncer => "Bouncer",
            Length::FullToss => "Full Toss",
        }
    }
}

impl FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Length::ALL
            .into_iter()
            .find(|l| l.key() == s)
            .ok_or_else(|| format!("unknown length: {}", s))
    }
}

/// Single-choice deliveries from the spin menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinDelivery {
    OffSpin,
    CarromBall,
    Doosra,
    ArmBall,
    Topspin,
    LegSpin,
    Googly,
    Flipper,
    Slider,
    Drifter,
}

impl SpinDelivery {
    const OFF_SPIN_MENU: [SpinDelivery; 5] = [
        SpinDelivery::OffSpin,
        SpinDelivery::CarromBall,
        SpinDelivery::Doosra,
        SpinDelivery::ArmBall,
        SpinDelivery::Topspin,
    ];

    const LEG_SPIN_MENU: [SpinDelivery; 5] = [
        SpinDelivery::LegSpin,
        SpinDelivery::Googly,
        SpinDelivery::Flipper,
        SpinDelivery::Slider,
        SpinDelivery::Drifter,
    ];

    /// Menu for a spin specialty. Fast bowlers have no single-choice menu.
    pub fn menu(specialty: BowlerSpecialty) -> &'static [SpinDelivery] {
        match specialty {
            BowlerSpecialty::OffSpin => &Self::OFF_SPIN_MENU,
            BowlerSpecialty::LegSpin => &Self::LEG_SPIN_MENU,
            BowlerSpecialty::Fast => &[],
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SpinDelivery::OffSpin => "off_spin",
            SpinDelivery::CarromBall => "carrom_ball",
            SpinDelivery::Doosra => "doosra",
            SpinDelivery::ArmBall => "arm_ball",
            SpinDelivery::Topspin => "topspin",
            SpinDelivery::LegSpin => "leg_spin",
            SpinDelivery::Googly => "googly",
            SpinDelivery::Flipper => "flipper",
            SpinDelivery::Slider => "slider",
            SpinDelivery::Drifter => "drifter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpinDelivery::OffSpin => "Off Spin",
            SpinDelivery::CarromBall => "Carrom Ball",
            SpinDelivery::Doosra => "Doosra",
            SpinDelivery::ArmBall => "Arm Ball",
            SpinDelivery::Topspin => "Topspin",
            SpinDelivery::LegSpin => "Leg Spin",
            SpinDelivery::Googly => "Googly",
            SpinDelivery::Flipper => "Flipper",
            SpinDelivery::Slider => "Slider",
            SpinDelivery::Drifter => "Drifter",
        }
    }
}

impl FromStr for SpinDelivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::OFF_SPIN_MENU
            .into_iter()
            .chain(Self::LEG_SPIN_MENU)
            .find(|d| d.key() == s)
            .ok_or_else(|| format!("unknown spin delivery: {}", s))
    }
}

/// What the bowler sent down. Kept on the record for display and commentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    Pace { pace: PaceType, length: Length },
    Spin { delivery: SpinDelivery },
}

impl std::fmt::Display for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delivery::Pace { pace, length } => write!(f, "{} {}", pace.label(), length.label()),
            Delivery::Spin { delivery } => write!(f, "{}", delivery.label()),
        }
    }
}

/// Result of one legal ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "dot")]
    Dot,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "wicket")]
    Wicket,
}

impl Outcome {
    /// Runs credited to the batsman and the innings.
    pub fn runs(&self) -> u32 {
        match self {
            Outcome::Dot | Outcome::Wicket => 0,
            Outcome::One => 1,
            Outcome::Two => 2,
            Outcome::Three => 3,
            Outcome::Four => 4,
            Outcome::Six => 6,
        }
    }

    pub fn is_wicket(&self) -> bool {
        matches!(self, Outcome::Wicket)
    }

    /// Odd runs send the batsmen to opposite ends.
    pub fn swaps_strike(&self) -> bool {
        matches!(self, Outcome::One | Outcome::Three)
    }

    /// Timeline symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Dot => "•",
            Outcome::One => "1",
            Outcome::Two => "2",
            Outcome::Three => "3",
            Outcome::Four => "4",
            Outcome::Six => "6",
            Outcome::Wicket => "W",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissalKind {
    Bowled,
    Caught,
    Lbw,
    Stumped,
    RunOut,
}

impl DismissalKind {
    pub const ALL: [DismissalKind; 5] = [
        DismissalKind::Bowled,
        DismissalKind::Caught,
        DismissalKind::Lbw,
        DismissalKind::Stumped,
        DismissalKind::RunOut,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DismissalKind::Bowled => "Bowled",
            DismissalKind::Caught => "Caught",
            DismissalKind::Lbw => "LBW",
            DismissalKind::Stumped => "Stumped",
            DismissalKind::RunOut => "Run out",
        }
    }

    /// Batting-card notation, e.g. `lbw b Bumrah`. Run outs carry no
    /// bowler credit.
    pub fn scorecard(&self, bowler: &str) -> String {
        match self {
            DismissalKind::Bowled => format!("b {}", bowler),
            DismissalKind::Caught => format!("c & b {}", bowler),
            DismissalKind::Lbw => format!("lbw b {}", bowler),
            DismissalKind::Stumped => format!("st † b {}", bowler),
            DismissalKind::RunOut => "run out".to_string(),
        }
    }
}

/// One resolved ball. Appended to the timeline and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallRecord {
    pub innings: u8,
    /// Zero-based over index.
    pub over: u32,
    /// One-based ball number within the over.
    pub ball_in_over: u8,
    pub striker: PlayerId,
    pub bowler: PlayerId,
    pub shot: ShotType,
    /// `None` when the difficulty keeps the delivery hidden.
    pub delivery: Option<Delivery>,
    pub speed_kmph: u16,
    pub outcome: Outcome,
    pub dismissal: Option<DismissalKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scorecard_notation() {
        assert_eq!(DismissalKind::Bowled.scorecard("Starc"), "b Starc");
        assert_eq!(DismissalKind::Caught.scorecard("Starc"), "c & b Starc");
        assert_eq!(DismissalKind::Lbw.scorecard("Starc"), "lbw b Starc");
        assert_eq!(DismissalKind::Stumped.scorecard("Lyon"), "st † b Lyon");
        assert_eq!(DismissalKind::RunOut.scorecard("Lyon"), "run out");
    }

    #[test]
    fn test_outcome_runs_and_swaps() {
        assert_eq!(Outcome::Six.runs(), 6);
        assert_eq!(Outcome::Wicket.runs(), 0);
        assert!(Outcome::One.swaps_strike());
        assert!(Outcome::Three.swaps_strike());
        assert!(!Outcome::Two.swaps_strike());
        assert!(!Outcome::Wicket.swaps_strike());
    }

    #[test]
    fn test_outcome_serializes_as_symbol_names() {
        assert_eq!(serde_json::to_string(&Outcome::Four).unwrap(), "\"4\"");
        assert_eq!(serde_json::to_string(&Outcome::Dot).unwrap(), "\"dot\"");
    }

    #[test]
    fn test_delivery_display() {
        let pace = Delivery::Pace {
            pace: PaceType::ReverseSwing,
            length: Length::Yorker,
        };
        assert_eq!(pace.to_string(), "Reverse Swing Yorker");
        let spin = Delivery::Spin {
            delivery: SpinDelivery::Googly,
        };
        assert_eq!(spin.to_string(), "Googly");
    }

    #[test]
    fn test_spin_menus() {
        assert_eq!(SpinDelivery::menu(BowlerSpecialty::OffSpin).len(), 5);
        assert!(SpinDelivery::menu(BowlerSpecialty::LegSpin).contains(&SpinDelivery::Googly));
        assert!(SpinDelivery::menu(BowlerSpecialty::Fast).is_empty());
    }

    #[test]
    fn test_shot_parses_from_key() {
        assert_eq!("Sweep".parse::<ShotType>().unwrap(), ShotType::Sweep);
        assert!("reverse-ramp".parse::<ShotType>().is_err());
    }
}
