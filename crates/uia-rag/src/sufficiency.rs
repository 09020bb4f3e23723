//! Step 6: Sufficiency gate (§4.6). Estimates how well the packed context
//! covers the question; general-knowledge supplementation is permitted iff
//! policy allows it AND the estimated sufficiency is below threshold.

use tracing::warn;
use uia_core::config::SUFFICIENCY_THRESHOLD;
use uia_llm::{parse_json_response, CompletionOptions, LlmClient};

use crate::types::{Candidate, SufficiencyResult};

const SYSTEM_PROMPT: &str = "You judge whether retrieved context is sufficient to answer a \
question about data science careers and skills. Respond with a single JSON object only: \
{\"sufficiency\": number between 0 and 1, \"missing_aspects\": [string, ...]}.";

pub async fn assess_sufficiency(llm: &dyn LlmClient, opts: &CompletionOptions, question: &str, kept: &[Candidate]) -> SufficiencyResult {
    if kept.is_empty() {
        return SufficiencyResult::zero();
    }

    let prompt = build_prompt(question, kept);
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.0,
        max_tokens: 256,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => match parse_json_response::<SufficiencyResult>(&raw) {
            Ok(mut result) => {
                result.sufficiency = result.sufficiency.clamp(0.0, 1.0);
                result
            }
            Err(e) => {
                warn!(error = %e, "sufficiency response unparsable, defaulting to 0.0");
                SufficiencyResult::zero()
            }
        },
        Err(e) => {
            warn!(error = %e, "sufficiency call failed, defaulting to 0.0");
            SufficiencyResult::zero()
        }
    }
}

/// Whether general-knowledge supplementation may engage (§4.6 step 6):
/// policy permits it AND the planner voted for it AND sufficiency is low.
pub fn allow_general_knowledge(config_allows: bool, planner_allows: bool, sufficiency: f32) -> bool {
    config_allows && planner_allows && sufficiency < SUFFICIENCY_THRESHOLD
}

fn build_prompt(question: &str, kept: &[Candidate]) -> String {
    let mut out = format!("Question: {question}\n\nKept context summaries:\n");
    for c in kept {
        let summary: String = c.text.chars().take(200).collect();
        out.push_str(&format!("- {}: {}\n", c.breadcrumb, summary));
    }
    out
}
