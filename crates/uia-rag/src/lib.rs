//! RAG Engine (C6, §4.6): plan -> retrieve -> rerank -> filter -> pack ->
//! sufficiency -> compose -> validate, built atop `uia-retrieval` (C5) and
//! `uia-llm` (C1).

mod compose;
pub mod error;
mod engine;
mod filter;
mod pack;
mod plan;
mod rerank;
mod retrieve;
mod sufficiency;
mod types;
mod validate;

pub use engine::RagEngine;
pub use error::{RagError, Result};
pub use types::{Candidate, RagAnswer, RagPlan, RagRequest, RagSource, SufficiencyResult, ValidationResult};
