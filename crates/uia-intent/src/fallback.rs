//! Rule-based fallback intent detector (§4.7 ambient detail), used only
//! when the LLM call errors. Matches fixed English substring hint lists
//! against the normalized message text; always reports lower confidence
//! than the LLM path.

use uia_catalog::Catalog;
use uia_core::textnorm::normalize;

use crate::detector::IntentResult;

/// Confidence reported by the rule-based fallback -- always lower than a
/// typical LLM-path confidence (>=0.7), per §4.7's "resulting confidence
/// must be lower."
pub const FALLBACK_CONFIDENCE: f32 = 0.4;

const EMPLOYMENT_HINTS: &[&str] = &[
    "i am a", "i'm a", "i work as", "my job is", "my role is", "i work in", "career as", "profession",
];

const SKILLS_HINTS: &[&str] = &[
    "python",
    "sql",
    "pandas",
    "numpy",
    "machine learning",
    "ml",
    "deep learning",
    "statistics",
    "data visualization",
    "tableau",
    "power bi",
    "excel",
    "r programming",
    "scikit-learn",
    "tensorflow",
    "pytorch",
    "etl",
    "data cleaning",
    "a/b testing",
    "nlp",
];

/// Rule-based detection: substring hints plus a category name/alias scan for
/// `category_hit`. Used only as a fallback when the LLM call errors.
pub fn detect_fallback(catalog: &Catalog, message: &str) -> IntentResult {
    let norm = normalize(message);

    let employment_intent = EMPLOYMENT_HINTS.iter().any(|h| norm.contains(h));
    let skills_intent = SKILLS_HINTS.iter().any(|h| norm.contains(h));
    let category_hit = find_category_hit(catalog, &norm);

    IntentResult {
        employment_intent: employment_intent || category_hit.is_some(),
        skills_intent,
        category_hit,
        confidence: FALLBACK_CONFIDENCE,
    }
}

/// Scans each category's name and declared aliases for a normalized
/// substring match against the message. `resolve_category` requires an
/// exact normalized match on the whole text, which free-form chat text
/// rarely is, so the fallback scans substrings instead.
fn find_category_hit(catalog: &Catalog, norm_message: &str) -> Option<String> {
    for ec in catalog.categories() {
        let names = std::iter::once(ec.name.as_str()).chain(ec.aliases.iter().map(String::as_str));
        for name in names {
            let norm_name = normalize(name);
            if !norm_name.is_empty() && norm_message.contains(&norm_name) {
                return Some(ec.id.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_employment_hint() {
        let catalog = Catalog::seeded();
        let result = detect_fallback(&catalog, "I am a data scientist working on pipelines");
        assert!(result.employment_intent);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn detects_skills_hint() {
        let catalog = Catalog::seeded();
        let result = detect_fallback(&catalog, "I've been learning python and pandas");
        assert!(result.skills_intent);
    }

    #[test]
    fn resolves_category_hit_via_alias() {
        let catalog = Catalog::seeded();
        let result = detect_fallback(&catalog, "I'm a Data Scientist");
        assert_eq!(result.category_hit, Some("ec_ds".to_string()));
    }

    #[test]
    fn neutral_message_detects_nothing() {
        let catalog = Catalog::seeded();
        let result = detect_fallback(&catalog, "what's the weather like today");
        assert!(!result.employment_intent);
        assert!(!result.skills_intent);
        assert!(result.category_hit.is_none());
    }
}
