//! The orchestrator has no error kind of its own — every stage's failure
//! already carries a `uia_core::UiaError` conversion (§7 "`UiaError` is the
//! top-level `thiserror` enum uniting every crate-local error via `#[from]`"),
//! so `run_turn` just propagates `UiaError` directly.

pub use uia_core::{ErrorKind, UiaError as OrchestratorError};
pub type Result<T> = std::result::Result<T, uia_core::UiaError>;
