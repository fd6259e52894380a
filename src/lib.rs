pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod ledger;
pub mod orchestration;
pub mod records;
pub mod roster;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    ChannelId, Coins, Difficulty, MatchConfig, MatchId, MatchResult, Player, PlayerId, PlayingXi,
    UserId,
};
pub use error::AppError;
pub use orchestration::{MatchOrchestrator, MatchOutcome, MatchRegistry, Settler, StartMatch};
