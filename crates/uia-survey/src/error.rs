use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    State(#[from] uia_state::StateError),

    #[error(transparent)]
    Catalog(#[from] uia_catalog::CatalogError),
}

impl SurveyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SurveyError::Validation(_) => ErrorKind::Validation,
            SurveyError::Conflict(_) => ErrorKind::Conflict,
            SurveyError::State(e) => e.kind(),
            SurveyError::Catalog(e) => e.kind(),
        }
    }
}

impl From<SurveyError> for UiaError {
    fn from(e: SurveyError) -> Self {
        match e.kind() {
            ErrorKind::Validation => UiaError::Validation(e.to_string()),
            ErrorKind::Conflict => UiaError::Conflict(e.to_string()),
            _ => UiaError::Transient(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;
