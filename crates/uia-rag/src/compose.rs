//! Step 7: Compose (§4.6). Calls the composer with the question, packed
//! context, style plan and sufficiency result. The composer must not emit
//! planning/execution language, shell commands or code fences; any general
//! knowledge used is confined to a trailing `Background (general)`
//! subsection bounded by `maxGeneralFraction`.

use tracing::warn;
use uia_llm::{CompletionOptions, LlmClient};

use crate::types::{RagPlan, SufficiencyResult};

const BACKGROUND_HEADING: &str = "Background (general)";

const SYSTEM_PROMPT_TEMPLATE: &str = "You are a data science career coaching assistant composing \
a grounded answer from retrieved context. Write in {tone} tone for a {audience} audience, in \
{format} where it fits the content -- default to paragraphs, use bullet points only for 3 or \
more genuinely parallel items, and small tables only for side-by-side comparisons. Never emit \
planning or execution language (no \"step 1\", \"first I will\", no shell commands), and never \
use fenced code blocks. Base your answer on the provided context. {general_clause}";

pub async fn compose(
    llm: &dyn LlmClient,
    opts: &CompletionOptions,
    question: &str,
    packed_context: &str,
    plan: &RagPlan,
    sufficiency: &SufficiencyResult,
    allow_general: bool,
    max_general_fraction: f32,
) -> String {
    let general_clause = if allow_general {
        format!(
            "If the context leaves gaps ({}), you may supplement with general knowledge, but \
             confine it strictly to a trailing \"{BACKGROUND_HEADING}\" subsection -- never blend \
             it into the grounded answer above it.",
            if sufficiency.missing_aspects.is_empty() {
                "general gaps".to_string()
            } else {
                sufficiency.missing_aspects.join(", ")
            }
        )
    } else {
        "Do not supplement with general knowledge; answer strictly from the provided context.".to_string()
    };

    let system = SYSTEM_PROMPT_TEMPLATE
        .replace("{tone}", &plan.tone)
        .replace("{audience}", &plan.audience)
        .replace("{format}", &plan.format)
        .replace("{general_clause}", &general_clause);

    let prompt = format!("Question: {question}\n\nContext:\n{packed_context}\n\nCompose the answer.");
    let call_opts = CompletionOptions {
        system: Some(system),
        temperature: 0.4,
        max_tokens: 1024,
        ..opts.clone()
    };

    let draft = match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "compose call failed, using a templated low-confidence answer");
            return templated_fallback(question);
        }
    };

    sanitize_and_bound(&draft, max_general_fraction)
}

fn templated_fallback(question: &str) -> String {
    format!(
        "I don't have enough grounded context right now to answer \"{question}\" with confidence. \
         Could you narrow down what aspect you'd like to focus on?"
    )
}

/// Strips fenced code blocks defensively and clamps the `Background
/// (general)` subsection to at most `max_general_fraction` of the total
/// character length, trimming from the end if it overruns.
fn sanitize_and_bound(draft: &str, max_general_fraction: f32) -> String {
    let no_fences = strip_code_fences(draft);

    let Some(idx) = no_fences.find(BACKGROUND_HEADING) else {
        return no_fences;
    };

    let (grounded, background) = no_fences.split_at(idx);
    let total_len = no_fences.len().max(1);
    let max_bg_len = (total_len as f32 * max_general_fraction).round() as usize;

    if background.len() <= max_bg_len {
        return no_fences;
    }

    let mut truncated = background[..max_bg_len.min(background.len())].to_string();
    if let Some(last_space) = truncated.rfind(char::is_whitespace) {
        truncated.truncate(last_space);
    }
    format!("{grounded}{truncated}")
}

/// Removes ``` fenced blocks while preserving any text outside them.
fn strip_code_fences(text: &str) -> String {
    let mut out = String::new();
    let mut in_fence = false;
    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_llm::MockLlmClient;

    fn plan() -> RagPlan {
        RagPlan::fallback("question")
    }

    #[tokio::test]
    async fn strips_fenced_code_blocks_from_the_draft() {
        let mock = MockLlmClient::new().with_default("Some answer.\n```python\nprint('hi')\n```\nMore text.");
        let opts = CompletionOptions::default();
        let result = compose(&mock, &opts, "q", "ctx", &plan(), &SufficiencyResult::zero(), false, 0.25).await;
        assert!(!result.contains("```"));
        assert!(result.contains("Some answer."));
        assert!(result.contains("More text."));
    }

    #[tokio::test]
    async fn bounds_background_section_length() {
        let long_bg = "word ".repeat(200);
        let draft = format!("Grounded answer body.\n\n{BACKGROUND_HEADING}\n{long_bg}");
        let mock = MockLlmClient::new().with_default(draft);
        let opts = CompletionOptions::default();
        let result = compose(&mock, &opts, "q", "ctx", &plan(), &SufficiencyResult::zero(), true, 0.1).await;
        let bg_start = result.find(BACKGROUND_HEADING).unwrap();
        let bg_len = result.len() - bg_start;
        let grounded_len = bg_start;
        assert!((bg_len as f32) <= (grounded_len as f32 + bg_len as f32) * 0.15);
    }

    #[tokio::test]
    async fn llm_failure_yields_templated_fallback() {
        let mock = MockLlmClient::new();
        let opts = CompletionOptions::default();
        let result = compose(&mock, &opts, "what should I learn?", "ctx", &plan(), &SufficiencyResult::zero(), false, 0.25).await;
        assert!(result.contains("what should I learn?"));
    }
}
