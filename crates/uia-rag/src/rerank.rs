//! Step 3: Rerank (§4.6). Sends up to 50 candidates (breadcrumb + first
//! ~400 chars) to the LLM and asks it to select 8-12 of the most relevant.
//! A parse failure falls back to the first N candidates in retrieval order.

use serde::Deserialize;
use tracing::warn;
use uia_llm::{parse_json_response, CompletionOptions, LlmClient};

use crate::types::Candidate;

const MAX_CANDIDATES_IN: usize = 50;
const FALLBACK_COUNT: usize = 10;
const EXCERPT_CHARS: usize = 400;

const SYSTEM_PROMPT: &str = "You rerank retrieved passages for a data science career coaching \
assistant. Given the user's question and a numbered list of candidate passages (each with an \
id and a short excerpt), select the 8 to 12 passages most useful for answering, ordered most \
to least relevant. Respond with a single JSON object only: {\"selected\": [\"chunkId\", ...]}.";

#[derive(Debug, Deserialize)]
struct RerankResponse {
    #[serde(default)]
    selected: Vec<String>,
}

pub async fn rerank(llm: &dyn LlmClient, opts: &CompletionOptions, question: &str, candidates: &[Candidate]) -> Vec<Candidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let pool: Vec<&Candidate> = candidates.iter().take(MAX_CANDIDATES_IN).collect();
    let prompt = build_prompt(question, &pool);
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.0,
        max_tokens: 512,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => match parse_json_response::<RerankResponse>(&raw) {
            Ok(resp) if !resp.selected.is_empty() => select_by_id(&pool, &resp.selected),
            Ok(_) => {
                warn!("rerank response selected no chunks, falling back to raw order");
                fallback(&pool)
            }
            Err(e) => {
                warn!(error = %e, "rerank response unparsable, falling back to raw order");
                fallback(&pool)
            }
        },
        Err(e) => {
            warn!(error = %e, "rerank call failed, falling back to raw order");
            fallback(&pool)
        }
    }
}

fn build_prompt(question: &str, pool: &[&Candidate]) -> String {
    let mut out = format!("Question: {question}\n\nCandidates:\n");
    for c in pool {
        let excerpt: String = c.text.chars().take(EXCERPT_CHARS).collect();
        out.push_str(&format!("- id: {}\n  breadcrumb: {}\n  excerpt: {}\n", c.chunk_id, c.breadcrumb, excerpt));
    }
    out
}

fn select_by_id(pool: &[&Candidate], selected_ids: &[String]) -> Vec<Candidate> {
    selected_ids
        .iter()
        .filter_map(|id| pool.iter().find(|c| &c.chunk_id == id).map(|c| (*c).clone()))
        .collect()
}

fn fallback(pool: &[&Candidate]) -> Vec<Candidate> {
    pool.iter().take(FALLBACK_COUNT).map(|c| (*c).clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_llm::MockLlmClient;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            chunk_id: id.to_string(),
            breadcrumb: format!("breadcrumb-{id}"),
            text: format!("text body for {id}"),
        }
    }

    #[tokio::test]
    async fn selects_named_candidates_in_model_order() {
        let candidates = vec![candidate("a"), candidate("b"), candidate("c")];
        let mock = MockLlmClient::new().with_default(r#"{"selected": ["c", "a"]}"#);
        let opts = CompletionOptions::default();
        let result = rerank(&mock, &opts, "question", &candidates).await;
        assert_eq!(result.iter().map(|c| c.chunk_id.clone()).collect::<Vec<_>>(), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn falls_back_to_raw_order_on_parse_failure() {
        let candidates = vec![candidate("a"), candidate("b")];
        let mock = MockLlmClient::new().with_default("not json");
        let opts = CompletionOptions::default();
        let result = rerank(&mock, &opts, "question", &candidates).await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn empty_candidates_short_circuits() {
        let mock = MockLlmClient::new();
        let opts = CompletionOptions::default();
        let result = rerank(&mock, &opts, "question", &[]).await;
        assert!(result.is_empty());
    }
}
