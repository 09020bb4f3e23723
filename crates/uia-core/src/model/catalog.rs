use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An opaque short token key for an insight's answer set, e.g. `"A"`, `"B"`.
pub type AnswerId = String;
pub type CategoryId = String;
pub type SkillId = String;
pub type BatchId = String;
pub type InsightId = String;

/// `{id, name, description, aliases[], skills[]}` — immutable within a taxonomy version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// `{id, name, aliases[]}` — owned by exactly one EmploymentCategory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// `{batchId, name, language, vaultVersion, insights[]}` — active flag; immutable per version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightBatch {
    pub batch_id: BatchId,
    pub name: String,
    pub language: String,
    pub vault_version: String,
    pub is_active: bool,
    pub insights: Vec<Insight>,
}

/// `{insightId, question, isMultiSelect, answers: map<answerId -> {text, aliases[]}>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub insight_id: InsightId,
    pub batch_id: BatchId,
    pub question: String,
    pub is_multi_select: bool,
    pub answers: HashMap<AnswerId, InsightAnswer>,
    /// Preserves declaration order — `HashMap` iteration order is not stable,
    /// but option enumeration (§4.10, §8 scenario 5) must be deterministic.
    pub answer_order: Vec<AnswerId>,
}

impl Insight {
    /// Canonical labels in declared order, for option-enumeration nudges (§4.10).
    pub fn canonical_labels(&self) -> Vec<&str> {
        self.answer_order
            .iter()
            .filter_map(|id| self.answers.get(id).map(|a| a.text.as_str()))
            .collect()
    }

    pub fn is_valid_answer(&self, answer_id: &str) -> bool {
        self.answers.contains_key(answer_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightAnswer {
    pub text: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}
