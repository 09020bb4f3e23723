//! Scope gate (C7, §4.7, §4.11 step 2). Decides whether a message is
//! in-scope for the Data Science Career Coach before any other stage runs.

use serde::Deserialize;
use tracing::warn;
use uia_llm::{parse_json_response, CompletionOptions, LlmClient};

const SYSTEM_PROMPT: &str = "You are the scope gate for a Data Science Career Coach assistant. \
In-scope topics: career guidance, skill assessment, learning paths, the employment taxonomy \
this assistant covers, and questions about the assistant/system itself. Out-of-scope topics: \
general coding help unrelated to a career discussion, unrelated trivia, and requests to execute \
code or produce scripts/shell commands. A re-ask of a pending nudge question and any direct \
domain question are always in-scope. Respond with a single JSON object only: \
{\"proceed\": bool, \"is_about_system\": bool, \"message\": string}. When \"proceed\" is false, \
\"message\" must be one single friendly declarative sentence explaining the refusal. When \
\"is_about_system\" is true, \"proceed\" must also be true.";

const EXPLAINER: &str = "I'm a career coaching assistant focused on data science: I can help you \
figure out your employment track, assess your current skills, surface a personalized learning \
path, and answer questions about the taxonomy of categories and skills I track.";

const OUT_OF_SCOPE_FALLBACK: &str =
    "I can only help with data science career guidance, skills, and learning paths, not general coding requests.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOutcome {
    Proceed,
    Reject { message: String },
    Explain { message: String },
}

#[derive(Debug, Deserialize)]
struct ScopeResponse {
    #[serde(default = "default_true")]
    proceed: bool,
    #[serde(default)]
    is_about_system: bool,
    #[serde(default)]
    message: String,
}

fn default_true() -> bool {
    true
}

/// Special-cases "about the system" questions to a templated explainer
/// before checking the message-level hints or falling through to the LLM.
pub async fn classify_scope(llm: &dyn LlmClient, opts: &CompletionOptions, message: &str, has_pending_nudge: bool) -> ScopeOutcome {
    if is_about_system_question(message) {
        return ScopeOutcome::Explain {
            message: EXPLAINER.to_string(),
        };
    }

    if has_pending_nudge {
        // A re-ask of a pending nudge is always in-scope (§4.7) -- skip the
        // LLM round-trip entirely for this common, cheap-to-decide case.
        return ScopeOutcome::Proceed;
    }

    let prompt = format!("User message: {message}");
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.0,
        max_tokens: 256,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => match parse_json_response::<ScopeResponse>(&raw) {
            Ok(resp) if resp.is_about_system => ScopeOutcome::Explain {
                message: if resp.message.trim().is_empty() { EXPLAINER.to_string() } else { resp.message },
            },
            Ok(resp) if resp.proceed => ScopeOutcome::Proceed,
            Ok(resp) => ScopeOutcome::Reject {
                message: if resp.message.trim().is_empty() { OUT_OF_SCOPE_FALLBACK.to_string() } else { resp.message },
            },
            Err(e) => {
                warn!(error = %e, "scope classifier response unparsable, defaulting to proceed");
                ScopeOutcome::Proceed
            }
        },
        Err(e) => {
            warn!(error = %e, "scope classifier call failed, defaulting to proceed");
            ScopeOutcome::Proceed
        }
    }
}

/// Cheap keyword check for "what can you do" / "how does this work"
/// style queries, applied before the LLM round-trip.
fn is_about_system_question(message: &str) -> bool {
    let norm = uia_core::textnorm::normalize(message);
    const HINTS: &[&str] = &[
        "what can you do",
        "how does this work",
        "how do you work",
        "what is this",
        "who are you",
        "what are you",
    ];
    HINTS.iter().any(|h| norm.contains(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_llm::MockLlmClient;

    #[tokio::test]
    async fn about_system_question_routes_to_explainer() {
        let mock = MockLlmClient::new();
        let opts = CompletionOptions::default();
        let outcome = classify_scope(&mock, &opts, "What can you do?", false).await;
        assert!(matches!(outcome, ScopeOutcome::Explain { .. }));
    }

    #[tokio::test]
    async fn pending_nudge_reask_always_proceeds() {
        let mock = MockLlmClient::new();
        let opts = CompletionOptions::default();
        let outcome = classify_scope(&mock, &opts, "videos", true).await;
        assert_eq!(outcome, ScopeOutcome::Proceed);
    }

    #[tokio::test]
    async fn out_of_scope_message_is_rejected() {
        let mock = MockLlmClient::new().with_default(
            r#"{"proceed": false, "is_about_system": false, "message": "I can only help with data science career topics."}"#,
        );
        let opts = CompletionOptions::default();
        let outcome = classify_scope(&mock, &opts, "write me a python script to sort a list", false).await;
        assert!(matches!(outcome, ScopeOutcome::Reject { .. }));
    }

    #[tokio::test]
    async fn in_scope_message_proceeds() {
        let mock = MockLlmClient::new().with_default(r#"{"proceed": true, "is_about_system": false, "message": ""}"#);
        let opts = CompletionOptions::default();
        let outcome = classify_scope(&mock, &opts, "I work with ML pipelines", false).await;
        assert_eq!(outcome, ScopeOutcome::Proceed);
    }
}
