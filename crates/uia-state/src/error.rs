use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// P1/P2: the field is already recorded and cannot be changed.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl StateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StateError::Database(_) => ErrorKind::Transient,
            StateError::Serialization(_) => ErrorKind::Transient,
            StateError::Conflict(_) => ErrorKind::Conflict,
            StateError::NotFound(_) => ErrorKind::Validation,
        }
    }
}

impl From<StateError> for UiaError {
    fn from(e: StateError) -> Self {
        match e {
            StateError::Conflict(msg) => UiaError::Conflict(msg),
            StateError::NotFound(msg) => UiaError::Validation(msg),
            other => UiaError::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
