//! Survey Builder (C8, §4.8): constructs employment/skills/insight surveys
//! from catalog + recorded state, and validates/records submissions.

mod build;
pub mod error;
mod submit;

pub use build::{build_employment_survey, build_insight_survey_envelope, build_skills_survey};
pub use error::{Result, SurveyError};
pub use submit::{submit_employment_survey, submit_insight_survey, submit_skills_survey, InsightSubmissionOutcome};
