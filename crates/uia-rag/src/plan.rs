//! Step 1: Plan (§4.6). Asks the planner model to turn the current question
//! (plus optionally the prior turn) into 2-4 retrieval sub-queries and a
//! style plan.

use tracing::{debug, warn};
use uia_llm::{parse_json_response, ClientError, CompletionOptions, LlmClient};

use crate::types::RagPlan;

const SYSTEM_PROMPT: &str = "You are the retrieval planner for a data science career coaching \
assistant. Given the user's current question (and, if relevant, their previous question), \
produce 2 to 4 short, distinct retrieval sub-queries that would find the passages needed to \
answer well. Also decide a style plan: tone, format, audience and whether linking to the \
previous turn helps. Respond with a single JSON object only: \
{\"link_prev\": bool, \"queries\": [string, ...], \"doc_filters\": [string, ...], \
\"style\": string, \"tone\": string, \"format\": string, \"audience\": string, \
\"allow_general_knowledge\": bool, \"notes\": string}. No prose outside the JSON object.";

pub async fn plan(
    llm: &dyn LlmClient,
    opts: &CompletionOptions,
    current_question: &str,
    previous_question: Option<&str>,
) -> RagPlan {
    let prompt = build_prompt(current_question, previous_question);
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.2,
        max_tokens: 512,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => match parse_json_response::<RagPlan>(&raw) {
            Ok(mut parsed) => {
                sanitize(&mut parsed, current_question);
                parsed
            }
            Err(e) => {
                warn!(error = %e, "rag plan response did not parse, using fallback");
                RagPlan::fallback(current_question)
            }
        },
        Err(ClientError::Cancelled) => RagPlan::fallback(current_question),
        Err(e) => {
            warn!(error = %e, "rag planner call failed, using fallback plan");
            RagPlan::fallback(current_question)
        }
    }
}

fn build_prompt(current_question: &str, previous_question: Option<&str>) -> String {
    match previous_question {
        Some(prev) => format!(
            "Previous question: {prev}\nCurrent question: {current_question}\n\nPlan the retrieval."
        ),
        None => format!("Current question: {current_question}\n\nPlan the retrieval."),
    }
}

/// Clamp the planner's sub-query count into the contractual 2-4 range and
/// guarantee at least the raw question survives if the model returned none.
fn sanitize(plan: &mut RagPlan, current_question: &str) {
    plan.queries.retain(|q| !q.trim().is_empty());
    if plan.queries.is_empty() {
        plan.queries.push(current_question.to_string());
    }
    if plan.queries.len() > 4 {
        plan.queries.truncate(4);
    }
    while plan.queries.len() < 2 {
        plan.queries.push(current_question.to_string());
    }
    debug!(queries = ?plan.queries, "rag plan sanitized");
}
