use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Input to one RAG Engine invocation (§4.6).
pub struct RagRequest {
    pub request_id: String,
    pub current_question: String,
    pub previous_question: Option<String>,
    /// Document-id allowlist, when the caller wants retrieval scoped to a
    /// subset of the corpus. `None` means "search everything."
    pub doc_filters: Option<HashSet<String>>,
    /// Whether the caller's policy (e.g. `RagConfig::allow_general_knowledge`)
    /// permits general-knowledge supplementation at all; the planner's own
    /// `allow_general_knowledge` vote is ANDed with this.
    pub allow_general_knowledge: bool,
    pub max_general_fraction: f32,
    pub token_limit: u32,
}

/// A source the composed answer drew on, surfaced to the caller (§4.6 return shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSource {
    pub chunk_id: String,
    pub breadcrumb: String,
}

/// The RAG Engine's return shape (§4.6): `{used, answerMarkdown, sources}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub used: bool,
    pub answer_markdown: String,
    pub sources: Vec<RagSource>,
}

impl RagAnswer {
    pub fn unused() -> Self {
        Self {
            used: false,
            answer_markdown: String::new(),
            sources: Vec::new(),
        }
    }
}

/// Step 1 output: the planner's sub-query and style decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagPlan {
    #[serde(default)]
    pub link_prev: bool,
    pub queries: Vec<String>,
    #[serde(default)]
    pub doc_filters: Vec<String>,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default)]
    pub allow_general_knowledge: bool,
    #[serde(default)]
    pub notes: String,
}

fn default_style() -> String {
    "informative".to_string()
}
fn default_tone() -> String {
    "warm".to_string()
}
fn default_format() -> String {
    "paragraphs".to_string()
}
fn default_audience() -> String {
    "general".to_string()
}

impl RagPlan {
    /// Deterministic fallback when the planner call fails: a single
    /// sub-query from the raw question, linking the previous turn never.
    pub fn fallback(question: &str) -> Self {
        Self {
            link_prev: false,
            queries: vec![question.to_string()],
            doc_filters: Vec::new(),
            style: default_style(),
            tone: default_tone(),
            format: default_format(),
            audience: default_audience(),
            allow_general_knowledge: false,
            notes: String::new(),
        }
    }
}

/// A retrieved-and-resolved candidate passed into rerank/filter/pack.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub chunk_id: String,
    pub breadcrumb: String,
    pub text: String,
}

/// Step 6: sufficiency gate output.
#[derive(Debug, Clone, Deserialize)]
pub struct SufficiencyResult {
    #[serde(default)]
    pub sufficiency: f32,
    #[serde(default)]
    pub missing_aspects: Vec<String>,
}

impl SufficiencyResult {
    pub fn zero() -> Self {
        Self {
            sufficiency: 0.0,
            missing_aspects: Vec::new(),
        }
    }
}

/// Step 8: validator output.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationResult {
    #[serde(default)]
    pub on_topic: bool,
    #[serde(default)]
    pub contradiction: bool,
    #[serde(default)]
    pub revision: Option<String>,
}
