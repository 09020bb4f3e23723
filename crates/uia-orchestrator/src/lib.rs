//! Turn Orchestrator (C11, §4.11): the deterministic per-message pipeline
//! that drives the scope gate, intent/survey gating, Stage-1 insight
//! inference, the RAG engine and the nudge generator, in that order, and
//! persists the resulting assistant message.

pub mod error;
mod history;
mod turn;

pub use error::{OrchestratorError, Result};
pub use history::{ChatHistory, InMemoryChatHistory};
pub use turn::TurnOrchestrator;
