//! Nudge Generator (C10, §4.10). Chooses at most one stage among
//! `employment_category > skills > insights > none`, in that priority,
//! and composes a single warm encouragement sentence for it.

use tracing::warn;

use uia_catalog::Catalog;
use uia_core::model::Insight;
use uia_llm::{CompletionOptions, LlmClient};
use uia_state::ChatStateStore;

use crate::error::Result;

const MAX_INLINE_LABELS: usize = 4;

const EMPLOYMENT_SYSTEM_PROMPT: &str = "You compose a single warm sentence nudging a chat user to \
name their employment category. Reference at most 4 likely labels inline, verbatim, from the list \
given. Never invent a category not in the list.";

const SKILLS_SYSTEM_PROMPT: &str = "You compose a single warm sentence nudging a chat user to name \
skills they use, scoped to their already-selected employment category. Reference at most 4 likely \
skill labels inline, verbatim, from the list given. Never invent a skill not in the list.";

const INSIGHT_SYSTEM_PROMPT: &str = "You compose a single warm, option-enumerating question for a \
chat user. The question must include every one of the given canonical answer labels verbatim, \
separated by commas with \"or\" before the last, and end with \"(reply with the exact words)\".";

/// Decides the single stage a turn's nudge should target, given recorded
/// chat state. Returns `None` when any survey was already prepared this
/// turn, or when every stage is already satisfied (`None` stage, §4.10
/// ambient detail: "any survey prepared" suppresses the nudge outright).
pub async fn generate_nudge(
    llm: &dyn LlmClient,
    opts: &CompletionOptions,
    store: &ChatStateStore,
    catalog: &Catalog,
    chat_id: &str,
    user_text: &str,
    surveys_prepared_this_turn: usize,
) -> Result<Option<String>> {
    if surveys_prepared_this_turn > 0 {
        return Ok(None);
    }

    let state = store.get_chat_state(chat_id)?;

    let category_id = state.as_ref().and_then(|s| s.employment_category_id.clone());
    if category_id.is_none() {
        return Ok(Some(employment_nudge(llm, opts, catalog).await));
    }

    let skills_recorded = state.as_ref().is_some_and(|s| s.skills_recorded());
    if !skills_recorded {
        let category_id = category_id.unwrap();
        return Ok(Some(skills_nudge(llm, opts, catalog, &category_id).await));
    }

    match select_eligible_insight(store, catalog, chat_id, user_text)? {
        Some(insight) => Ok(Some(insight_nudge(llm, opts, insight).await)),
        None => Ok(None),
    }
}

async fn employment_nudge(llm: &dyn LlmClient, opts: &CompletionOptions, catalog: &Catalog) -> String {
    let labels: Vec<&str> = catalog
        .categories()
        .iter()
        .take(MAX_INLINE_LABELS)
        .map(|c| c.name.as_str())
        .collect();
    let joined = join_with_or(&labels);

    let prompt = format!("Likely employment categories: {joined}");
    let call_opts = CompletionOptions {
        system: Some(EMPLOYMENT_SYSTEM_PROMPT.to_string()),
        temperature: 0.4,
        max_tokens: 120,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) | Err(_) => format!("Which of these best describes your role -- {joined}?"),
    }
}

async fn skills_nudge(llm: &dyn LlmClient, opts: &CompletionOptions, catalog: &Catalog, category_id: &str) -> String {
    let labels: Vec<&str> = catalog
        .skills_for(category_id)
        .map(|skills| skills.iter().take(MAX_INLINE_LABELS).map(|s| s.name.as_str()).collect())
        .unwrap_or_default();
    let joined = join_with_or(&labels);

    let prompt = format!("Likely skills for this category: {joined}");
    let call_opts = CompletionOptions {
        system: Some(SKILLS_SYSTEM_PROMPT.to_string()),
        temperature: 0.4,
        max_tokens: 120,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) | Err(_) => format!("Which of these skills do you use -- {joined}?"),
    }
}

async fn insight_nudge(llm: &dyn LlmClient, opts: &CompletionOptions, insight: &Insight) -> String {
    let labels = insight.canonical_labels();
    let joined = join_with_or(&labels);

    let prompt = format!("Insight question: {}\nCanonical answer labels: {joined}", insight.question);
    let call_opts = CompletionOptions {
        system: Some(INSIGHT_SYSTEM_PROMPT.to_string()),
        temperature: 0.4,
        max_tokens: 160,
        ..opts.clone()
    };

    match llm.complete_json(&prompt, &call_opts).await {
        Ok(text) if labels.iter().all(|l| text.contains(l)) => text.trim().to_string(),
        Ok(_) => {
            warn!(insight_id = %insight.insight_id, "nudge draft missing a canonical label, using deterministic template");
            deterministic_insight_template(&insight.question, &labels)
        }
        Err(e) => {
            warn!(error = %e, insight_id = %insight.insight_id, "nudge call failed, using deterministic template");
            deterministic_insight_template(&insight.question, &labels)
        }
    }
}

fn deterministic_insight_template(question: &str, labels: &[&str]) -> String {
    format!("{question} {} (reply with the exact words)", join_with_or(labels))
}

/// §4.10: "the first eligible batch (touched or fully complete batches are
/// skipped)" -- a batch already touched by Stage-1 is left to the insight
/// survey (§4.8), which enumerates its pending rows in full; the nudge only
/// reaches for a batch the user hasn't engaged with at all yet. Within the
/// first eligible batch, pick the pending insight with the highest
/// occurrence count of any answer label/alias in the user's message, ties
/// broken by earlier position in the batch.
fn select_eligible_insight<'a>(
    store: &ChatStateStore,
    catalog: &'a Catalog,
    chat_id: &str,
    user_text: &str,
) -> Result<Option<&'a Insight>> {
    let touched = store
        .get_session(chat_id)?
        .map(|s| s.touched_batch_ids)
        .unwrap_or_default();

    for batch in catalog.batches().iter().filter(|b| b.is_active) {
        if touched.contains(&batch.batch_id) {
            continue;
        }

        let mut fully_complete = true;
        for insight in &batch.insights {
            let taken = store
                .get_insight_state(chat_id, &insight.insight_id)?
                .is_some_and(|s| s.taken);
            if !taken {
                fully_complete = false;
                break;
            }
        }
        if fully_complete {
            continue;
        }

        let norm_text = user_text.to_lowercase();
        let mut best: Option<(&Insight, usize)> = None;
        for insight in &batch.insights {
            let taken = store
                .get_insight_state(chat_id, &insight.insight_id)?
                .is_some_and(|s| s.taken);
            if taken {
                continue;
            }

            let score = insight
                .answers
                .values()
                .flat_map(|a| std::iter::once(a.text.as_str()).chain(a.aliases.iter().map(String::as_str)))
                .filter(|label| !label.is_empty())
                .map(|label| norm_text.matches(&label.to_lowercase()).count())
                .sum();

            let replace = match &best {
                Some((_, best_score)) => score > *best_score,
                None => true,
            };
            if replace {
                best = Some((insight, score));
            }
        }
        return Ok(best.map(|(insight, _)| insight));
    }
    Ok(None)
}

fn join_with_or(items: &[&str]) -> String {
    match items.len() {
        0 => String::new(),
        1 => items[0].to_string(),
        2 => format!("{} or {}", items[0], items[1]),
        _ => {
            let (last, rest) = items.split_last().unwrap();
            format!("{} or {}", rest.join(", "), last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use uia_llm::MockLlmClient;

    fn fresh_store() -> ChatStateStore {
        ChatStateStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn surveys_prepared_suppresses_nudge() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        let mock = MockLlmClient::new();
        let opts = CompletionOptions::default();
        let result = generate_nudge(&mock, &opts, &store, &catalog, "chat1", "hi", 1).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn no_category_yields_employment_nudge() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        let mock = MockLlmClient::new().with_default("Are you a Data Scientist or something else?");
        let opts = CompletionOptions::default();
        let result = generate_nudge(&mock, &opts, &store, &catalog, "chat1", "hi", 0).await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn category_set_but_no_skills_yields_skills_nudge() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        store.set_employment_category("chat1", "ec_ds", catalog.vault_version()).unwrap();
        let mock = MockLlmClient::new().with_default("Do you use Python or SQL?");
        let opts = CompletionOptions::default();
        let result = generate_nudge(&mock, &opts, &store, &catalog, "chat1", "hi", 0).await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn insight_nudge_falls_back_to_deterministic_template_when_labels_missing() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        store.set_employment_category("chat1", "ec_ds", catalog.vault_version()).unwrap();
        store.set_skills(
            "chat1",
            Some(["sk_python".to_string()].into_iter().collect()),
            false,
        ).ok();

        let mock = MockLlmClient::new().with_default("Tell me more about that!");
        let opts = CompletionOptions::default();
        let result = generate_nudge(&mock, &opts, &store, &catalog, "chat1", "hi", 0).await.unwrap();
        assert!(result.is_some());
        let text = result.unwrap();
        assert!(text.ends_with("(reply with the exact words)"));
    }

    #[test]
    fn join_with_or_formats_three_items() {
        assert_eq!(join_with_or(&["a", "b", "c"]), "a, b or c");
    }
}
