use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("index build task panicked: {0}")]
    BuildPanicked(String),

    #[error("empty index")]
    EmptyIndex,
}

impl RetrievalError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transient
    }
}

impl From<RetrievalError> for UiaError {
    fn from(e: RetrievalError) -> Self {
        UiaError::Transient(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
