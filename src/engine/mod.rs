//! Synchronous match logic: random source, outcome table, statistics,
//! innings transitions and presentation snapshots.

pub mod innings;
pub mod resolver;
pub mod rng;
pub mod snapshot;
pub mod tracker;

pub use innings::{InningsEnd, InningsSetup, InningsState, StateChange};
pub use resolver::{OutcomeResolver, Resolution};
pub use rng::{pick, RandomSource, SeededRandom, SequenceRandom};
pub use snapshot::{
    ball_commentary, BatsmanLine, BattingCardEntry, BowlerLine, InningsSummary, LiveSnapshot,
    WicketCard,
};
pub use tracker::{BallEffects, FallOfWicket, Partnership, ShotPlacement, StatsTracker};
