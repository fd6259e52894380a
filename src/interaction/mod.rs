//! Turn-based interaction plumbing: prompts, the await-choice gateway,
//! the presentation sink, and scripted responders.

pub mod gateway;
pub mod prompt;
pub mod scripted;
pub mod sink;

pub use gateway::{ChannelResponses, ChoiceGateway, DecisionError, MatchIo, ResponseStream};
pub use prompt::{ActorResponse, ChoiceOption, DecisionStage, Prompt};
pub use scripted::{AutoPilot, ScriptedResponses};
pub use sink::{EventFeed, MatchEvent, MatchSink, SequencedEvent};
