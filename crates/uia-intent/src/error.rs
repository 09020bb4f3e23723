use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum IntentError {
    #[error("llm call failed: {0}")]
    Llm(String),
}

impl IntentError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transient
    }
}

impl From<IntentError> for UiaError {
    fn from(e: IntentError) -> Self {
        UiaError::Transient(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IntentError>;
