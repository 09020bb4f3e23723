use thiserror::Error;

/// Coarse classification used by the orchestrator to decide degrade-vs-propagate
/// without matching on the specific variant, and by the progress broker's
/// `error` event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ScopeRejection,
    Validation,
    Conflict,
    Transient,
    Fatal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ScopeRejection => "scope_rejection",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Conflict => "conflict_error",
            ErrorKind::Transient => "transient",
            ErrorKind::Fatal => "fatal",
        }
    }
}

#[derive(Debug, Error)]
pub enum UiaError {
    #[error("scope rejection: {0}")]
    ScopeRejection(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UiaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UiaError::ScopeRejection(_) => ErrorKind::ScopeRejection,
            UiaError::Validation(_) => ErrorKind::Validation,
            UiaError::Conflict(_) => ErrorKind::Conflict,
            UiaError::Transient(_) => ErrorKind::Transient,
            UiaError::Fatal(_) => ErrorKind::Fatal,
            UiaError::Database(_) => ErrorKind::Transient,
            UiaError::Config(_) => ErrorKind::Fatal,
            UiaError::Serialization(_) => ErrorKind::Transient,
        }
    }
}

pub type Result<T> = std::result::Result<T, UiaError>;
