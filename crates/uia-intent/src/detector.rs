//! Employment/skills intent detector (C7, §4.7). Distinguishes a mere
//! mention of the employment field from an explicit role claim, and flags
//! concrete skill mentions, primarily via an LLM call with a rule-based
//! fallback for transient failures.

use serde::Deserialize;
use tracing::warn;
use uia_catalog::Catalog;
use uia_llm::{parse_json_response, CompletionOptions, LlmClient};

use crate::fallback::detect_fallback;

const SYSTEM_PROMPT: &str = "You classify a user's message for a Data Science Career Coach. Set \
\"categoryHit\" to the id of an employment category only when the user states an explicit role \
name (e.g. \"I am a data scientist\"), not a passing mention of the field. Set \"employmentIntent\" \
to true whenever the employment category is mentioned at all, even in passing. Set \"skillsIntent\" \
to true only when concrete skills, tools, or techniques are named. Respond with a single JSON \
object only: {\"employmentIntent\": bool, \"skillsIntent\": bool, \"categoryHit\": string|null, \
\"confidence\": number}.";

#[derive(Debug, Clone, PartialEq)]
pub struct IntentResult {
    pub employment_intent: bool,
    pub skills_intent: bool,
    pub category_hit: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    #[serde(default)]
    employment_intent: bool,
    #[serde(default)]
    skills_intent: bool,
    #[serde(default)]
    category_hit: Option<String>,
    #[serde(default)]
    confidence: f32,
}

/// Detects employment/skills intent, preferring the LLM and falling back to
/// the rule-based detector on any call or parse failure.
pub async fn detect_intent(llm: &dyn LlmClient, opts: &CompletionOptions, catalog: &Catalog, message: &str) -> IntentResult {
    let prompt = format!(
        "Known employment categories: {}\nUser message: {message}",
        known_categories(catalog)
    );
    let call_opts = CompletionOptions {
        system: Some(SYSTEM_PROMPT.to_string()),
        temperature: 0.0,
        max_tokens: 256,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(raw) => match parse_json_response::<IntentResponse>(&raw) {
            Ok(resp) => IntentResult {
                employment_intent: resp.employment_intent,
                skills_intent: resp.skills_intent,
                category_hit: resp
                    .category_hit
                    .filter(|id| catalog.category(id).is_some()),
                confidence: resp.confidence.clamp(0.0, 1.0),
            },
            Err(e) => {
                warn!(error = %e, "intent detector response unparsable, using rule-based fallback");
                detect_fallback(catalog, message)
            }
        },
        Err(e) => {
            warn!(error = %e, "intent detector call failed, using rule-based fallback");
            detect_fallback(catalog, message)
        }
    }
}

fn known_categories(catalog: &Catalog) -> String {
    catalog
        .categories()
        .iter()
        .map(|ec| format!("{} ({})", ec.id, ec.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_llm::MockLlmClient;

    #[tokio::test]
    async fn explicit_role_claim_sets_category_hit() {
        let catalog = Catalog::seeded();
        let mock = MockLlmClient::new().with_default(
            r#"{"employmentIntent": true, "skillsIntent": false, "categoryHit": "ec_ds", "confidence": 0.9}"#,
        );
        let opts = CompletionOptions::default();
        let result = detect_intent(&mock, &opts, &catalog, "I am a data scientist").await;
        assert!(result.employment_intent);
        assert_eq!(result.category_hit, Some("ec_ds".to_string()));
        assert_eq!(result.confidence, 0.9);
    }

    #[tokio::test]
    async fn unknown_category_id_from_llm_is_dropped() {
        let catalog = Catalog::seeded();
        let mock = MockLlmClient::new().with_default(
            r#"{"employmentIntent": true, "skillsIntent": false, "categoryHit": "ec_bogus", "confidence": 0.8}"#,
        );
        let opts = CompletionOptions::default();
        let result = detect_intent(&mock, &opts, &catalog, "I work in some field").await;
        assert_eq!(result.category_hit, None);
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_rule_based_detector() {
        let catalog = Catalog::seeded();
        let mock = MockLlmClient::new();
        let opts = CompletionOptions::default();
        let result = detect_intent(&mock, &opts, &catalog, "I use python and pandas daily").await;
        assert!(result.skills_intent);
        assert_eq!(result.confidence, crate::fallback::FALLBACK_CONFIDENCE);
    }
}
