//! Nudge Generator (C10, §4.10): one encouragement question per turn,
//! chosen by stage priority and suppressed whenever a survey was prepared.

pub mod error;
mod nudge;

pub use error::{NudgeError, Result};
pub use nudge::generate_nudge;
