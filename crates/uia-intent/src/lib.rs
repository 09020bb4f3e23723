//! Intent Detector (C7, §4.7): scope gate plus employment/skills intent
//! classification, each LLM-first with a deterministic fallback.

mod detector;
pub mod error;
mod fallback;
mod scope;

pub use detector::{detect_intent, IntentResult};
pub use error::{IntentError, Result};
pub use fallback::{detect_fallback, FALLBACK_CONFIDENCE};
pub use scope::{classify_scope, ScopeOutcome};
