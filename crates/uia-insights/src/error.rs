use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("llm call failed: {0}")]
    Llm(String),

    #[error(transparent)]
    State(#[from] uia_state::StateError),
}

impl InsightsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightsError::Llm(_) => ErrorKind::Transient,
            InsightsError::State(e) => e.kind(),
        }
    }
}

impl From<InsightsError> for UiaError {
    fn from(e: InsightsError) -> Self {
        match e.kind() {
            ErrorKind::Conflict => UiaError::Conflict(e.to_string()),
            ErrorKind::Validation => UiaError::Validation(e.to_string()),
            _ => UiaError::Transient(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;
