use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single per-turn progress notification (§4.4, §4.11).
///
/// `label` is the opaque stage identifier the client renders
/// (e.g. `"2.3 insights_stage1"`, `"rag.rerank"`); `detail` is an optional
/// human-readable elaboration.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub request_id: String,
    pub label: String,
    pub detail: Option<String>,
    pub emitted_at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(request_id: impl Into<String>, label: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            request_id: request_id.into(),
            label: label.into(),
            detail,
            emitted_at: Utc::now(),
        }
    }
}

/// Canonical stage labels (§4.11 per-turn sequence, §4.6 RAG sub-stages).
/// Centralized here so every emitting crate uses an identical string.
pub mod labels {
    pub const RECEIVED: &str = "1.0 received";
    pub const SCOPE_GATE: &str = "2.0 scope_gate";
    pub const INTENT: &str = "2.1 intent";
    pub const SURVEY_GATE: &str = "2.2 survey_gate";
    pub const INSIGHTS_STAGE1: &str = "2.3 insights_stage1";
    pub const RAG_INIT: &str = "2.4 rag_init";
    pub const RAG_PLAN: &str = "rag.plan";
    pub const RAG_RETRIEVE: &str = "rag.retrieve";
    pub const RAG_RERANK: &str = "rag.rerank";
    pub const RAG_FILTER: &str = "rag.filter";
    pub const RAG_PACK: &str = "rag.pack";
    pub const RAG_SUFFICIENCY: &str = "rag.sufficiency";
    pub const RAG_COMPOSE: &str = "rag.compose";
    pub const RAG_VALIDATE: &str = "rag.validate";
    pub const NUDGE: &str = "3.1 nudge";
    pub const COMPOSE: &str = "4.0 compose";
    pub const DONE: &str = "done";
    pub const ERROR: &str = "error";
}
