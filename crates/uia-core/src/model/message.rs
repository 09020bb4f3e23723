use super::catalog::{AnswerId, BatchId, CategoryId, InsightId, SkillId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Survey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyType {
    EcSurvey,
    SkillsSurvey,
    InsightSurvey,
}

/// A single source citation attached to a RAG-grounded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub chunk_id: String,
    pub breadcrumb: String,
}

/// `{id, chatId, role, type, content, surveyType?, survey?, encQuestion?, sources?, scopeLabel?, createdAt}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub role: MessageRole,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub survey_type: Option<SurveyType>,
    pub survey: Option<Survey>,
    /// Single-sentence nudge, present only when no survey is attached (P6).
    pub enc_question: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    pub scope_label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// P6: an assistant message never carries both `survey` and a non-empty `encQuestion`.
    pub fn satisfies_survey_precedence(&self) -> bool {
        !(self.survey.is_some() && self.enc_question.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

/// One option offered within a survey question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentSurvey {
    pub options: Vec<SurveyOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsSurvey {
    pub category_id: CategoryId,
    pub options: Vec<SurveyOption>,
    pub max_select: u8,
    pub let_system_decide_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightQuestionKind {
    Single,
    Multi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSurveyQuestion {
    pub insight_id: InsightId,
    pub kind: InsightQuestionKind,
    pub question: String,
    pub options: Vec<SurveyOption>,
    /// "Other (write-in)" affordance (§4.8).
    pub allow_write_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSurveyBatchPayload {
    pub batch_id: BatchId,
    pub questions: Vec<InsightSurveyQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSurveyEnvelope {
    pub batches: Vec<InsightSurveyBatchPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Survey {
    Employment(EmploymentSurvey),
    Skills(SkillsSurvey),
    Insight(InsightSurveyEnvelope),
}

/// A single answer submitted against an insight survey question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSurveySubmission {
    pub insight_id: InsightId,
    pub answer_ids: Vec<AnswerId>,
    pub write_in: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsSurveySubmission {
    pub skill_ids: Vec<SkillId>,
    pub let_system_decide: bool,
}
