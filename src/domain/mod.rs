//! Domain types for the match engine.
//!
//! This module provides:
//! - Identifiers: UserId, PlayerId, MatchId, ChannelId, Coins
//! - Players, roles, bowler specialties and the validated playing XI
//! - Ball vocabulary: shots, deliveries, outcomes, dismissals, ball records
//! - Batting/bowling figures and the final match result

pub mod ball;
pub mod figures;
pub mod match_config;
pub mod player;
pub mod primitives;
pub mod result;
pub mod toss;

pub use ball::{
    BallRecord, Delivery, DismissalKind, Length, Outcome, PaceType, ShotType, SpinDelivery,
};
pub use figures::{BatsmanFigures, BowlerFigures, Milestone, Overs, BALLS_PER_OVER};
pub use match_config::{Difficulty, MatchConfig, MatchConfigError, MatchFormat};
pub use player::{BowlerSpecialty, BowlingStyle, LineupError, Player, PlayingXi, Role, XI_SIZE};
pub use primitives::{ChannelId, Coins, MatchId, PlayerId, UserId};
pub use result::{InningsScore, Margin, MatchResult, MAX_WICKETS};
pub use toss::{CoinFace, TossChoice};
