//! Insight Inference Stage-1 (C9, §4.9). Given `(chatId, userText)`, sends
//! the Vault Pack under a strict prompt, applies confidence thresholds,
//! parses multi-answer responses, and expands touched batches with
//! `batch_fill` pending rows for every insight left untouched this turn.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use uia_catalog::Catalog;
use uia_core::model::{ChatInsightState, Insight, InsightMode, PendingReason};
use uia_llm::{parse_json_response, CompletionOptions, LlmClient};
use uia_state::ChatStateStore;

use crate::error::{InsightsError, Result};

/// Auto-take threshold for `QUESTION_AND_ANSWER`/`ANSWER_ONLY` decisions.
/// Below it, such a decision is dropped entirely -- there is no
/// intermediate pending tier for these two match types.
pub const AUTO_TAKE_THRESHOLD: f32 = 0.75;
/// Auto-take threshold for `QUESTION_ONLY` decisions; below it, the
/// decision is dropped as noise.
pub const QUESTION_ONLY_THRESHOLD: f32 = 0.60;

const SYSTEM_PROMPT: &str = "You infer a Data Scientist's profile from their chat messages against a fixed \
insight vault. Only emit a decision when the user's text provides clear, quotable evidence -- never \
speculate to fill every insight. `decisionConfidence` must reflect genuine match strength, not slot-filling \
pressure. Every string in `evidence` must be a verbatim substring of the user's message. Respond with a \
single JSON object: {\"decisions\": [{\"matchType\": \"QUESTION_AND_ANSWER\"|\"ANSWER_ONLY\"|\"QUESTION_ONLY\", \
\"insightId\": string, \"batchId\": string, \"matchedAnswerId\": string|null, \"decisionConfidence\": number, \
\"evidence\": [string]}]}.";

#[derive(Debug, Deserialize)]
struct RawDecision {
    #[serde(rename = "matchType")]
    match_type: String,
    #[serde(rename = "insightId")]
    insight_id: String,
    #[serde(rename = "batchId")]
    batch_id: String,
    #[serde(rename = "matchedAnswerId", default)]
    matched_answer_id: Option<String>,
    #[serde(rename = "decisionConfidence", default)]
    decision_confidence: f32,
    #[serde(default)]
    evidence: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Stage1LlmResponse {
    #[serde(default)]
    decisions: Vec<RawDecision>,
}

#[derive(Debug, Clone, Default)]
pub struct Stage1Result {
    pub vault_version: String,
    pub touched_batch_ids: HashSet<String>,
    pub pending_by_batch: HashMap<String, Vec<ChatInsightState>>,
    pub taken_count: u32,
    pub pending_count: u32,
    pub auto_taken_count: u32,
    pub question_only_count: u32,
}

pub async fn run_stage1(
    llm: &dyn LlmClient,
    opts: &CompletionOptions,
    store: &ChatStateStore,
    catalog: &Catalog,
    chat_id: &str,
    user_text: &str,
) -> Result<Stage1Result> {
    store.ensure_session(chat_id, catalog.vault_version())?;

    let pack = catalog.build_vault_pack();
    let pack_json = serde_json::to_string(&pack).unwrap_or_default();
    let prompt = format!("Vault pack: {pack_json}\nUser message: {user_text}");
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.0,
        max_tokens: 1024,
        ..opts.clone()
    };

    let raw = llm
        .complete_json(&prompt, &call_opts)
        .await
        .map_err(|e| InsightsError::Llm(e.to_string()))?;
    let parsed: Stage1LlmResponse =
        parse_json_response(&raw).map_err(|e| InsightsError::Llm(e.to_string()))?;

    let mut touched = HashSet::new();
    let mut auto_taken_count = 0u32;
    let mut question_only_count = 0u32;

    for decision in &parsed.decisions {
        let Some((catalog_batch_id, insight)) = catalog.insight(&decision.insight_id) else {
            warn!(insight_id = %decision.insight_id, "stage-1 decision names unknown insight, dropping");
            continue;
        };
        if catalog_batch_id != decision.batch_id {
            warn!(
                insight_id = %decision.insight_id,
                claimed = %decision.batch_id,
                actual = %catalog_batch_id,
                "stage-1 decision batchId disagrees with catalog mapping, dropping"
            );
            continue;
        }
        if let Some(existing) = store.get_insight_state(chat_id, &decision.insight_id)? {
            if existing.taken {
                touched.insert(catalog_batch_id.to_string());
                continue; // immutable once taken, but still counts as touched
            }
        }

        let confidence = decision.decision_confidence.clamp(0.0, 1.0);

        match decision.match_type.as_str() {
            "QUESTION_ONLY" => {
                if confidence >= QUESTION_ONLY_THRESHOLD {
                    store.write_pending(
                        chat_id,
                        catalog_batch_id,
                        &decision.insight_id,
                        PendingReason::QuestionOnly,
                        confidence,
                        catalog.vault_version(),
                    )?;
                    question_only_count += 1;
                    touched.insert(catalog_batch_id.to_string());
                }
            }
            "QUESTION_AND_ANSWER" | "ANSWER_ONLY" => {
                let Some(raw_answer) = &decision.matched_answer_id else {
                    continue;
                };
                let answer_ids = parse_answer_ids(raw_answer, insight);
                if answer_ids.is_empty() {
                    continue;
                }

                if confidence >= AUTO_TAKE_THRESHOLD {
                    let mode = if decision.match_type == "QUESTION_AND_ANSWER" {
                        InsightMode::Qa
                    } else {
                        InsightMode::AnswerOnly
                    };
                    if insight.is_multi_select {
                        store.write_auto_take_multi(
                            chat_id,
                            catalog_batch_id,
                            &decision.insight_id,
                            &answer_ids,
                            mode,
                            confidence,
                            &decision.evidence,
                            catalog.vault_version(),
                        )?;
                    } else {
                        store.write_auto_take_single(
                            chat_id,
                            catalog_batch_id,
                            &decision.insight_id,
                            &answer_ids[0],
                            mode,
                            confidence,
                            &decision.evidence,
                            catalog.vault_version(),
                        )?;
                    }
                    auto_taken_count += 1;
                    touched.insert(catalog_batch_id.to_string());
                }
                // else: below thresholds -> ignore, never touches the batch.
            }
            other => warn!(match_type = %other, "unknown stage-1 match type, dropping decision"),
        }
    }

    for batch_id in &touched {
        store.touch_batch(chat_id, batch_id, catalog.vault_version())?;
        if let Ok(active_ids) = catalog.active_insight_ids(batch_id) {
            for insight_id in active_ids {
                if store.get_insight_state(chat_id, &insight_id)?.is_none() {
                    store.write_batch_fill_if_absent(chat_id, batch_id, &insight_id, 0.0, catalog.vault_version())?;
                }
            }
        }
    }

    let (taken_count, pending_count) = store.recompute_stats(chat_id)?;
    let touched_vec: Vec<String> = touched.iter().cloned().collect();
    let pending_by_batch = store.list_pending_by_batch(chat_id, &touched_vec)?;

    Ok(Stage1Result {
        vault_version: catalog.vault_version().to_string(),
        touched_batch_ids: touched,
        pending_by_batch,
        taken_count,
        pending_count,
        auto_taken_count,
        question_only_count,
    })
}

fn split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[|,/\s]+").unwrap())
}

/// §4.9 multi-answer parsing: split on `|`, `,`, `/`, or whitespace,
/// uppercase, intersect with valid ids. A single-select insight that
/// returns a delimited list picks the first valid token only.
fn parse_answer_ids(raw: &str, insight: &Insight) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut valid: Vec<String> = split_re()
        .split(raw.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_uppercase())
        .filter(|t| insight.is_valid_answer(t))
        .filter(|t| seen.insert(t.clone()))
        .collect();

    if !insight.is_multi_select && valid.len() > 1 {
        valid.truncate(1);
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use uia_llm::MockLlmClient;

    fn fresh_store() -> ChatStateStore {
        ChatStateStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn parses_multi_answer_delimited_list() {
        let catalog = Catalog::seeded();
        let batch = catalog
            .batches()
            .iter()
            .find(|b| b.insights.iter().any(|i| i.is_multi_select))
            .expect("seeded fixture has a multi-select insight");
        let insight = batch.insights.iter().find(|i| i.is_multi_select).unwrap();
        let ids = &insight.answer_order;
        let raw = format!("{}|{}", ids[0], ids.get(1).cloned().unwrap_or_else(|| ids[0].clone()));
        let parsed = parse_answer_ids(&raw, insight);
        assert!(!parsed.is_empty());
        assert!(parsed.iter().all(|p| insight.is_valid_answer(p)));
    }

    #[test]
    fn single_select_takes_first_valid_token_only() {
        let catalog = Catalog::seeded();
        let batch = catalog
            .batches()
            .iter()
            .find(|b| b.insights.iter().any(|i| !i.is_multi_select))
            .expect("seeded fixture has a single-select insight");
        let insight = batch.insights.iter().find(|i| !i.is_multi_select).unwrap();
        if insight.answer_order.len() < 2 {
            return;
        }
        let raw = format!("{} {}", insight.answer_order[0], insight.answer_order[1]);
        let parsed = parse_answer_ids(&raw, insight);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], insight.answer_order[0]);
    }

    #[tokio::test]
    async fn auto_takes_high_confidence_decision_and_expands_batch() {
        let catalog = Catalog::seeded();
        let batch = catalog.batches().first().unwrap();
        let insight = batch.insights.first().unwrap();
        let answer_id = insight.answer_order.first().unwrap().clone();

        let response = format!(
            r#"{{"decisions": [{{"matchType": "ANSWER_ONLY", "insightId": "{}", "batchId": "{}", "matchedAnswerId": "{}", "decisionConfidence": 0.9, "evidence": ["yes"]}}]}}"#,
            insight.insight_id, batch.batch_id, answer_id
        );
        let mock = MockLlmClient::new().with_default(response);
        let opts = CompletionOptions::default();
        let store = fresh_store();

        let result = run_stage1(&mock, &opts, &store, &catalog, "chat1", "I love python").await.unwrap();
        assert_eq!(result.auto_taken_count, 1);
        assert!(result.touched_batch_ids.contains(&batch.batch_id));

        // every active insight in the batch now has a row (P5)
        for ins in &batch.insights {
            assert!(store.get_insight_state("chat1", &ins.insight_id).unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn low_confidence_decision_is_dropped() {
        let catalog = Catalog::seeded();
        let batch = catalog.batches().first().unwrap();
        let insight = batch.insights.first().unwrap();
        let answer_id = insight.answer_order.first().unwrap().clone();

        let response = format!(
            r#"{{"decisions": [{{"matchType": "ANSWER_ONLY", "insightId": "{}", "batchId": "{}", "matchedAnswerId": "{}", "decisionConfidence": 0.2, "evidence": []}}]}}"#,
            insight.insight_id, batch.batch_id, answer_id
        );
        let mock = MockLlmClient::new().with_default(response);
        let opts = CompletionOptions::default();
        let store = fresh_store();

        let result = run_stage1(&mock, &opts, &store, &catalog, "chat1", "hmm").await.unwrap();
        assert_eq!(result.auto_taken_count, 0);
        assert_eq!(result.question_only_count, 0);
        // A rejected decision is not "accepted" (§9 glossary), so it never
        // touches its batch, and nothing gets a row at all.
        assert!(!result.touched_batch_ids.contains(&batch.batch_id));
        assert!(store.get_insight_state("chat1", &insight.insight_id).unwrap().is_none());
    }

    #[tokio::test]
    async fn mid_confidence_qa_decision_is_dropped_not_pending() {
        let catalog = Catalog::seeded();
        let batch = catalog.batches().first().unwrap();
        let insight = batch.insights.first().unwrap();
        let answer_id = insight.answer_order.first().unwrap().clone();

        // 0.65 sits in [QUESTION_ONLY_THRESHOLD, AUTO_TAKE_THRESHOLD); for a
        // QA/ANSWER_ONLY decision this must be dropped outright, not written
        // as a question_only pending row (that tier only applies to an
        // actual QUESTION_ONLY matchType).
        let response = format!(
            r#"{{"decisions": [{{"matchType": "ANSWER_ONLY", "insightId": "{}", "batchId": "{}", "matchedAnswerId": "{}", "decisionConfidence": 0.65, "evidence": ["yes"]}}]}}"#,
            insight.insight_id, batch.batch_id, answer_id
        );
        let mock = MockLlmClient::new().with_default(response);
        let opts = CompletionOptions::default();
        let store = fresh_store();

        let result = run_stage1(&mock, &opts, &store, &catalog, "chat1", "hmm").await.unwrap();
        assert_eq!(result.auto_taken_count, 0);
        assert_eq!(result.question_only_count, 0);
        assert!(!result.touched_batch_ids.contains(&batch.batch_id));
        assert!(store.get_insight_state("chat1", &insight.insight_id).unwrap().is_none());
    }

    #[tokio::test]
    async fn taken_row_is_never_overwritten_by_a_later_decision() {
        let catalog = Catalog::seeded();
        let batch = catalog.batches().first().unwrap();
        let insight = batch.insights.first().unwrap();
        let first_answer = insight.answer_order.first().unwrap().clone();
        let store = fresh_store();

        store
            .write_auto_take_single(
                "chat1",
                &batch.batch_id,
                &insight.insight_id,
                &first_answer,
                InsightMode::AnswerOnly,
                0.9,
                &[],
                catalog.vault_version(),
            )
            .unwrap();

        let other_answer = insight.answer_order.get(1).cloned().unwrap_or(first_answer.clone());
        let response = format!(
            r#"{{"decisions": [{{"matchType": "ANSWER_ONLY", "insightId": "{}", "batchId": "{}", "matchedAnswerId": "{}", "decisionConfidence": 0.95, "evidence": []}}]}}"#,
            insight.insight_id, batch.batch_id, other_answer
        );
        let mock = MockLlmClient::new().with_default(response);
        let opts = CompletionOptions::default();

        run_stage1(&mock, &opts, &store, &catalog, "chat1", "still talking").await.unwrap();

        let state = store.get_insight_state("chat1", &insight.insight_id).unwrap().unwrap();
        match state.answer {
            Some(uia_core::model::TakenAnswer::Single(id)) => assert_eq!(id, first_answer),
            other => panic!("expected single answer unchanged, got {other:?}"),
        }
    }
}
