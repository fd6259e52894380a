//! Match orchestration: the interaction coordinator, the innings runner,
//! settlement, and the registry of running matches.

pub mod coordinator;
pub mod innings;
pub mod orchestrator;
pub mod registry;
pub mod settlement;

pub use coordinator::{BallPhase, Interrupt, InteractionCoordinator, PromptTimeouts, Stall, TossOutcome};
pub use innings::InningsMachine;
pub use orchestrator::{MatchOrchestrator, MatchOutcome, MatchSetup};
pub use registry::{DEFAULT_FINISHED_RETENTION, MatchRegistry, RegistryError, StartMatch};
pub use settlement::{
    Credit, PenaltyReport, RewardSchedule, SettlementError, SettlementReport, Settler,
};
