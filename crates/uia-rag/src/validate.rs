//! Step 8: Validate (§4.6). Re-calls the LLM with the draft and evidence
//! summaries; if it reports the draft off-topic, contradictory, or
//! policy-violating, substitutes the provided revision.

use tracing::warn;
use uia_llm::{parse_json_response, CompletionOptions, LlmClient};

use crate::types::{Candidate, ValidationResult};

const SYSTEM_PROMPT: &str = "You are a quality gate reviewing a composed answer for a data \
science career coaching assistant. Given the question, the evidence the answer was supposed \
to be grounded in, and the draft answer, decide whether the draft is on-topic, consistent with \
the evidence, and policy-compliant (no fenced code, no planning language). Respond with a \
single JSON object only: {\"on_topic\": bool, \"contradiction\": bool, \"revision\": string or \
null}. Only provide \"revision\" when the draft fails a check -- it should be a corrected \
replacement answer.";

pub async fn validate(llm: &dyn LlmClient, opts: &CompletionOptions, question: &str, draft: &str, evidence: &[Candidate]) -> String {
    let prompt = build_prompt(question, draft, evidence);
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.0,
        max_tokens: 1024,
        ..opts.clone()
    };

    let result = match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => match parse_json_response::<ValidationResult>(&raw) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "validation response unparsable, keeping draft as-is");
                return draft.to_string();
            }
        },
        Err(e) => {
            warn!(error = %e, "validation call failed, keeping draft as-is");
            return draft.to_string();
        }
    };

    let failed = !result.on_topic || result.contradiction;
    if failed {
        if let Some(revision) = result.revision {
            if !revision.trim().is_empty() {
                warn!("validation flagged the draft, substituting the provided revision");
                return revision;
            }
        }
        warn!("validation flagged the draft but provided no usable revision, keeping draft");
    }
    draft.to_string()
}

fn build_prompt(question: &str, draft: &str, evidence: &[Candidate]) -> String {
    let mut out = format!("Question: {question}\n\nDraft answer:\n{draft}\n\nEvidence summaries:\n");
    for c in evidence {
        let summary: String = c.text.chars().take(200).collect();
        out.push_str(&format!("- [{}] {}: {}\n", c.chunk_id, c.breadcrumb, summary));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_llm::MockLlmClient;

    #[tokio::test]
    async fn substitutes_revision_when_flagged() {
        let mock = MockLlmClient::new()
            .with_default(r#"{"on_topic": false, "contradiction": false, "revision": "corrected answer"}"#);
        let opts = CompletionOptions::default();
        let result = validate(&mock, &opts, "q", "bad draft", &[]).await;
        assert_eq!(result, "corrected answer");
    }

    #[tokio::test]
    async fn keeps_draft_when_passing() {
        let mock = MockLlmClient::new().with_default(r#"{"on_topic": true, "contradiction": false, "revision": null}"#);
        let opts = CompletionOptions::default();
        let result = validate(&mock, &opts, "q", "good draft", &[]).await;
        assert_eq!(result, "good draft");
    }

    #[tokio::test]
    async fn keeps_draft_when_flagged_without_usable_revision() {
        let mock = MockLlmClient::new().with_default(r#"{"on_topic": false, "contradiction": false, "revision": null}"#);
        let opts = CompletionOptions::default();
        let result = validate(&mock, &opts, "q", "draft", &[]).await;
        assert_eq!(result, "draft");
    }
}
