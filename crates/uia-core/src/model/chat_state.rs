use super::catalog::{AnswerId, BatchId, CategoryId, InsightId, SkillId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// `{chatId, employmentCategoryId?, skillsSelected?, letSystemDecide, vaultVersion}`.
///
/// Invariants (P1, P2): once `employment_category_id` is set it must never
/// change; once skills are recorded (`let_system_decide=true` or
/// `skills_selected` non-empty) they must never be re-recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUIAState {
    pub chat_id: String,
    pub employment_category_id: Option<CategoryId>,
    pub skills_selected: Option<HashSet<SkillId>>,
    pub let_system_decide: bool,
    pub vault_version: String,
    pub recorded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatUIAState {
    pub fn skills_recorded(&self) -> bool {
        self.let_system_decide || self.skills_selected.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// `{chatId, touchedBatchIds, stats, vaultVersion}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatInsightSession {
    pub chat_id: String,
    pub touched_batch_ids: HashSet<BatchId>,
    pub taken_count: u32,
    pub pending_count: u32,
    pub vault_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    QuestionOnly,
    BatchFill,
}

impl PendingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingReason::QuestionOnly => "question_only",
            PendingReason::BatchFill => "batch_fill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightSource {
    AutoInference,
    Survey,
    BatchExpansion,
}

impl InsightSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightSource::AutoInference => "auto-inference",
            InsightSource::Survey => "survey",
            InsightSource::BatchExpansion => "batch-expansion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightMode {
    Qa,
    AnswerOnly,
}

/// Which of the single/multi answer slots is populated for a taken row (P3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TakenAnswer {
    Single(AnswerId),
    Multi(Vec<AnswerId>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightMeta {
    pub source: InsightSource,
    pub mode: Option<InsightMode>,
    pub confidence: f32,
    pub evidence: Vec<String>,
    pub vault_version: String,
}

/// `{chatId, batchId, insightId, taken, answerId?|answerIds?, pendingReason, meta}`.
///
/// Invariant: if `taken=true` exactly one of `answer`'s variants is
/// populated and non-empty; if pending (`taken=None`), `answer` is `None`
/// and `pending_reason` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInsightState {
    pub chat_id: String,
    pub batch_id: BatchId,
    pub insight_id: InsightId,
    pub taken: bool,
    pub answer: Option<TakenAnswer>,
    pub pending_reason: Option<PendingReason>,
    pub meta: Option<InsightMeta>,
}

impl ChatInsightState {
    /// Checks P3/P4 for this single row.
    pub fn is_well_formed(&self) -> bool {
        if self.taken {
            match &self.answer {
                Some(TakenAnswer::Single(id)) => !id.is_empty(),
                Some(TakenAnswer::Multi(ids)) => {
                    !ids.is_empty() && {
                        let mut seen = HashSet::new();
                        ids.iter().all(|i| seen.insert(i))
                    }
                }
                None => false,
            }
        } else {
            self.answer.is_none()
        }
    }
}
