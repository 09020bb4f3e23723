//! Survey construction (C8, §4.8): `EmploymentSurvey`, `SkillsSurvey`, and
//! `InsightSurveyEnvelope` shapes built from catalog + recorded state.

use uia_catalog::Catalog;
use uia_core::model::{
    ChatInsightState, EmploymentSurvey, InsightQuestionKind, InsightSurveyBatchPayload,
    InsightSurveyEnvelope, InsightSurveyQuestion, PendingReason, SkillsSurvey, SurveyOption,
};

const MAX_SKILLS_SELECT: u8 = 4;

/// Single-select survey over every active employment category.
pub fn build_employment_survey(catalog: &Catalog) -> EmploymentSurvey {
    EmploymentSurvey {
        options: catalog
            .categories()
            .iter()
            .map(|ec| SurveyOption {
                id: ec.id.clone(),
                label: ec.name.clone(),
            })
            .collect(),
    }
}

/// Multi-select (up to 4) survey over a category's skills, with a
/// "let the system decide" shortcut.
pub fn build_skills_survey(catalog: &Catalog, category_id: &str) -> uia_catalog::Result<SkillsSurvey> {
    let skills = catalog.skills_for(category_id)?;
    Ok(SkillsSurvey {
        category_id: category_id.to_string(),
        options: skills
            .iter()
            .map(|s| SurveyOption {
                id: s.id.clone(),
                label: s.name.clone(),
            })
            .collect(),
        max_select: MAX_SKILLS_SELECT,
        let_system_decide_available: true,
    })
}

/// Builds one payload per touched batch containing only insights with
/// pending state, ordered `question_only` before `batch_fill`, tie-broken
/// by descending confidence (§4.8).
pub fn build_insight_survey_envelope(
    catalog: &Catalog,
    pending_by_batch: &std::collections::HashMap<String, Vec<ChatInsightState>>,
) -> InsightSurveyEnvelope {
    let mut batch_ids: Vec<&String> = pending_by_batch.keys().collect();
    batch_ids.sort();

    let mut batches = Vec::new();
    for batch_id in batch_ids {
        let rows = &pending_by_batch[batch_id];
        let Some(batch) = catalog.batch(batch_id) else { continue };

        let mut ordered: Vec<&ChatInsightState> = rows.iter().collect();
        ordered.sort_by(|a, b| {
            let rank = |r: &ChatInsightState| match r.pending_reason {
                Some(PendingReason::QuestionOnly) => 0,
                _ => 1,
            };
            rank(a).cmp(&rank(b)).then_with(|| {
                let ca = a.meta.as_ref().map(|m| m.confidence).unwrap_or(0.0);
                let cb = b.meta.as_ref().map(|m| m.confidence).unwrap_or(0.0);
                cb.partial_cmp(&ca).unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        let questions: Vec<InsightSurveyQuestion> = ordered
            .into_iter()
            .filter_map(|row| {
                let insight = batch.insights.iter().find(|i| i.insight_id == row.insight_id)?;
                Some(InsightSurveyQuestion {
                    insight_id: insight.insight_id.clone(),
                    kind: if insight.is_multi_select {
                        InsightQuestionKind::Multi
                    } else {
                        InsightQuestionKind::Single
                    },
                    question: insight.question.clone(),
                    options: insight
                        .answer_order
                        .iter()
                        .filter_map(|aid| insight.answers.get(aid).map(|a| SurveyOption {
                            id: aid.clone(),
                            label: a.text.clone(),
                        }))
                        .collect(),
                    allow_write_in: true,
                })
            })
            .collect();

        if !questions.is_empty() {
            batches.push(InsightSurveyBatchPayload {
                batch_id: batch_id.clone(),
                questions,
            });
        }
    }

    InsightSurveyEnvelope { batches }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employment_survey_lists_seeded_category() {
        let catalog = Catalog::seeded();
        let survey = build_employment_survey(&catalog);
        assert!(survey.options.iter().any(|o| o.id == "ec_ds"));
    }

    #[test]
    fn skills_survey_scoped_to_category() {
        let catalog = Catalog::seeded();
        let survey = build_skills_survey(&catalog, "ec_ds").unwrap();
        assert_eq!(survey.category_id, "ec_ds");
        assert!(survey.let_system_decide_available);
        assert!(!survey.options.is_empty());
    }

    #[test]
    fn insight_envelope_orders_question_only_before_batch_fill() {
        let catalog = Catalog::seeded();
        let batch = catalog.batches().first().unwrap();
        let insight = batch.insights.first().unwrap();

        let mut pending = std::collections::HashMap::new();
        pending.insert(
            batch.batch_id.clone(),
            vec![
                uia_core::model::ChatInsightState {
                    chat_id: "c1".into(),
                    batch_id: batch.batch_id.clone(),
                    insight_id: insight.insight_id.clone(),
                    taken: false,
                    answer: None,
                    pending_reason: Some(PendingReason::BatchFill),
                    meta: Some(uia_core::model::InsightMeta {
                        source: uia_core::model::InsightSource::BatchExpansion,
                        mode: None,
                        confidence: 0.5,
                        evidence: vec![],
                        vault_version: catalog.vault_version().to_string(),
                    }),
                },
            ],
        );
        let envelope = build_insight_survey_envelope(&catalog, &pending);
        assert_eq!(envelope.batches.len(), 1);
        assert_eq!(envelope.batches[0].questions[0].insight_id, insight.insight_id);
    }
}
