use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("llm call failed: {0}")]
    Llm(String),
}

impl RagError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transient
    }
}

impl From<RagError> for UiaError {
    fn from(e: RagError) -> Self {
        UiaError::Transient(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
