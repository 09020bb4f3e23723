use thiserror::Error;
use uia_core::{ErrorKind, UiaError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown employment category '{0}'")]
    UnknownCategory(String),

    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    #[error("skill '{skill}' does not belong to category '{category}'")]
    SkillNotInCategory { skill: String, category: String },

    #[error("unknown insight batch '{0}'")]
    UnknownBatch(String),

    #[error("unknown insight '{0}'")]
    UnknownInsight(String),

    #[error("invalid answer id '{answer}' for insight '{insight}'")]
    InvalidAnswer { insight: String, answer: String },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::UnknownCategory(_)
            | CatalogError::UnknownSkill(_)
            | CatalogError::UnknownBatch(_)
            | CatalogError::UnknownInsight(_)
            | CatalogError::InvalidAnswer { .. } => ErrorKind::Validation,
            CatalogError::SkillNotInCategory { .. } => ErrorKind::Validation,
        }
    }
}

impl From<CatalogError> for UiaError {
    fn from(e: CatalogError) -> Self {
        UiaError::Validation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
