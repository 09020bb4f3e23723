//! Step 4: Relevance filter (§4.6, §9 Open Question (ii)).
//!
//! This implements the stricter genuine keep/drop variant: each reranked
//! candidate's breadcrumb + excerpt is sent to the LLM alongside the
//! question, and a chunk not named in `keep` is dropped. An unparsable or
//! all-empty response degrades to a pass-through for that call only (never
//! crashes the turn) and logs a warning, per the spec's stated fallback.

use serde::Deserialize;
use tracing::warn;
use uia_llm::{parse_json_response, CompletionOptions, LlmClient};

use crate::types::Candidate;

const EXCERPT_CHARS: usize = 400;

const SYSTEM_PROMPT: &str = "You are a strict relevance filter for a data science career \
coaching assistant. Given the user's question and a list of candidate passages, keep only the \
ones that are genuinely relevant to answering the question -- drop tangential or off-topic \
ones. Respond with a single JSON object only: {\"keep\": [\"chunkId\", ...]}.";

#[derive(Debug, Deserialize)]
struct FilterResponse {
    #[serde(default)]
    keep: Vec<String>,
}

pub async fn filter_relevant(llm: &dyn LlmClient, opts: &CompletionOptions, question: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let prompt = build_prompt(question, &candidates);
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.0,
        max_tokens: 512,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => match parse_json_response::<FilterResponse>(&raw) {
            Ok(resp) if !resp.keep.is_empty() => {
                let kept: Vec<Candidate> = candidates.iter().filter(|c| resp.keep.contains(&c.chunk_id)).cloned().collect();
                if kept.is_empty() {
                    warn!("relevance filter named no candidate present in the input, passing through");
                    candidates
                } else {
                    kept
                }
            }
            _ => {
                warn!("relevance filter response empty or unparsable, passing through");
                candidates
            }
        },
        Err(e) => {
            warn!(error = %e, "relevance filter call failed, passing through");
            candidates
        }
    }
}

fn build_prompt(question: &str, candidates: &[Candidate]) -> String {
    let mut out = format!("Question: {question}\n\nCandidates:\n");
    for c in candidates {
        let excerpt: String = c.text.chars().take(EXCERPT_CHARS).collect();
        out.push_str(&format!("- id: {}\n  breadcrumb: {}\n  excerpt: {}\n", c.chunk_id, c.breadcrumb, excerpt));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_llm::MockLlmClient;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            chunk_id: id.to_string(),
            breadcrumb: format!("breadcrumb-{id}"),
            text: "some passage text".to_string(),
        }
    }

    #[tokio::test]
    async fn keeps_only_named_candidates() {
        let candidates = vec![candidate("a"), candidate("b")];
        let mock = MockLlmClient::new().with_default(r#"{"keep": ["b"]}"#);
        let opts = CompletionOptions::default();
        let result = filter_relevant(&mock, &opts, "q", candidates).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].chunk_id, "b");
    }

    #[tokio::test]
    async fn passes_through_on_empty_keep_list() {
        let candidates = vec![candidate("a"), candidate("b")];
        let mock = MockLlmClient::new().with_default(r#"{"keep": []}"#);
        let opts = CompletionOptions::default();
        let result = filter_relevant(&mock, &opts, "q", candidates).await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn passes_through_on_unparsable_response() {
        let candidates = vec![candidate("a")];
        let mock = MockLlmClient::new().with_default("garbage");
        let opts = CompletionOptions::default();
        let result = filter_relevant(&mock, &opts, "q", candidates).await;
        assert_eq!(result.len(), 1);
    }
}
