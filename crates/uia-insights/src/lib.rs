//! Insight Inference Stage-1 (C9, §4.9): infers vault answers from chat
//! text against a fixed insight catalog, with confidence thresholds and
//! per-turn batch expansion.

pub mod error;
mod stage1;

pub use error::{InsightsError, Result};
pub use stage1::{run_stage1, Stage1Result, AUTO_TAKE_THRESHOLD, QUESTION_ONLY_THRESHOLD};
