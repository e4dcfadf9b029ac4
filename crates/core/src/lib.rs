//! Game logic for a 20-questions guesser backed by a hosted language model.
//!
//! The HTTP service is a thin wrapper around [`orchestrator::TurnOrchestrator`].

pub mod error;
pub mod game_types;
pub mod interpreter;
pub mod llm_client;
pub mod orchestrator;
pub mod prompts;
pub mod repeat;

pub use error::GameError;
pub use game_types::{GameAction, HistoryEntry, Message, PromptContext, Role};
pub use orchestrator::{StepInput, TurnOrchestrator};
