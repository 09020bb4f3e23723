use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("llm call failed: {0}")]
    Llm(String),

    #[error(transparent)]
    State(#[from] uia_state::StateError),
}

impl NudgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NudgeError::Llm(_) => ErrorKind::Transient,
            NudgeError::State(e) => e.kind(),
        }
    }
}

impl From<NudgeError> for UiaError {
    fn from(e: NudgeError) -> Self {
        UiaError::Transient(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NudgeError>;
