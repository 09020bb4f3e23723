use std::collections::HashMap;

use uia_core::model::{EmploymentCategory, Insight, InsightBatch, Skill};

use crate::alias::AliasIndex;
use crate::error::{CatalogError, Result};
use crate::fixture;
use crate::vault_pack::{build_vault_pack, VaultPack};

/// The segment taxonomy (C2) plus the insight vault, held in memory.
///
/// Both are immutable within a `vault_version` (§3) — a new taxonomy
/// version is a new `Catalog` instance, not a mutation of this one.
#[derive(Debug, Clone)]
pub struct Catalog {
    vault_version: String,
    categories: Vec<EmploymentCategory>,
    category_index: HashMap<String, usize>,
    batches: Vec<InsightBatch>,
    /// insightId -> (batch index, insight index within that batch's `insights`)
    insight_index: HashMap<String, (usize, usize)>,
    aliases: AliasIndex,
}

impl Catalog {
    pub fn new(vault_version: String, categories: Vec<EmploymentCategory>, batches: Vec<InsightBatch>) -> Self {
        let category_index = categories
            .iter()
            .enumerate()
            .map(|(i, ec)| (ec.id.clone(), i))
            .collect();

        let mut insight_index = HashMap::new();
        for (bi, batch) in batches.iter().enumerate() {
            for (ii, ins) in batch.insights.iter().enumerate() {
                insight_index.insert(ins.insight_id.clone(), (bi, ii));
            }
        }

        let aliases = AliasIndex::build(&categories);

        Self {
            vault_version,
            categories,
            category_index,
            batches,
            insight_index,
            aliases,
        }
    }

    /// The built-in demo taxonomy + insight vault, ported from the
    /// originating system's seed scripts.
    pub fn seeded() -> Self {
        Self::new(fixture::vault_version(), fixture::seed_categories(), fixture::seed_batches())
    }

    pub fn vault_version(&self) -> &str {
        &self.vault_version
    }

    pub fn categories(&self) -> &[EmploymentCategory] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&EmploymentCategory> {
        self.category_index.get(id).map(|&i| &self.categories[i])
    }

    pub fn require_category(&self, id: &str) -> Result<&EmploymentCategory> {
        self.category(id).ok_or_else(|| CatalogError::UnknownCategory(id.to_string()))
    }

    /// Skill options available under a category, for a skills survey (§4.2, §6).
    pub fn skills_for(&self, category_id: &str) -> Result<&[Skill]> {
        Ok(&self.require_category(category_id)?.skills)
    }

    /// Validates that every skill id belongs to `category_id` (survey submission guard).
    pub fn validate_skills_belong_to_category(&self, category_id: &str, skill_ids: &[String]) -> Result<()> {
        let ec = self.require_category(category_id)?;
        for sid in skill_ids {
            if !ec.skills.iter().any(|s| &s.id == sid) {
                return Err(CatalogError::SkillNotInCategory {
                    skill: sid.clone(),
                    category: category_id.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn batches(&self) -> &[InsightBatch] {
        &self.batches
    }

    pub fn batch(&self, batch_id: &str) -> Option<&InsightBatch> {
        self.batches.iter().find(|b| b.batch_id == batch_id)
    }

    pub fn require_batch(&self, batch_id: &str) -> Result<&InsightBatch> {
        self.batch(batch_id).ok_or_else(|| CatalogError::UnknownBatch(batch_id.to_string()))
    }

    /// Insight ids declared by a batch, in declaration order.
    pub fn active_insight_ids(&self, batch_id: &str) -> Result<Vec<String>> {
        Ok(self
            .require_batch(batch_id)?
            .insights
            .iter()
            .map(|i| i.insight_id.clone())
            .collect())
    }

    /// `(batchId, &Insight)` for an insight id, searching all active batches.
    pub fn insight(&self, insight_id: &str) -> Option<(&str, &Insight)> {
        let (bi, ii) = *self.insight_index.get(insight_id)?;
        let batch = &self.batches[bi];
        if !batch.is_active {
            return None;
        }
        Some((batch.batch_id.as_str(), &batch.insights[ii]))
    }

    pub fn require_insight(&self, insight_id: &str) -> Result<(&str, &Insight)> {
        self.insight(insight_id).ok_or_else(|| CatalogError::UnknownInsight(insight_id.to_string()))
    }

    /// Validate that `insight_id` exists and (if provided) `answer_id` is one
    /// of its declared options. Mirrors `InsightVaultRepo.validate_insight_and_answer`.
    pub fn validate_insight_and_answer(&self, insight_id: &str, answer_id: Option<&str>) -> Result<(String, bool)> {
        let (batch_id, insight) = self.require_insight(insight_id)?;
        if let Some(aid) = answer_id {
            if !insight.is_valid_answer(aid) {
                return Err(CatalogError::InvalidAnswer {
                    insight: insight_id.to_string(),
                    answer: aid.to_string(),
                });
            }
        }
        Ok((batch_id.to_string(), insight.is_multi_select))
    }

    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    /// Build the Stage-1 Vault Pack sent to the LLM (§4.9).
    pub fn build_vault_pack(&self) -> VaultPack {
        build_vault_pack(&self.batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_resolves_known_category_and_skill() {
        let cat = Catalog::seeded();
        assert!(cat.category("ec_ds").is_some());
        assert_eq!(cat.aliases().resolve_category("data scientist"), Some("ec_ds".to_string()));
        assert_eq!(
            cat.aliases().resolve_skill("pandas", Some("ec_ds")),
            Some("sk_prog_wrangling".to_string())
        );
    }

    #[test]
    fn skill_validation_rejects_foreign_skill() {
        let cat = Catalog::seeded();
        let err = cat
            .validate_skills_belong_to_category("ec_ds", &["sk_nonexistent".to_string()])
            .unwrap_err();
        assert!(matches!(err, CatalogError::SkillNotInCategory { .. }));
    }

    #[test]
    fn insight_lookup_returns_owning_batch() {
        let cat = Catalog::seeded();
        let (batch_id, insight) = cat.require_insight("primary_learning_modes").unwrap();
        assert_eq!(batch_id, "cognitive_preferences_problem_solving");
        assert!(insight.is_multi_select);
    }

    #[test]
    fn vault_pack_includes_all_active_batches_and_insights() {
        let cat = Catalog::seeded();
        let pack = cat.build_vault_pack();
        assert_eq!(pack.batches.len(), 2);
        assert!(pack.insights.iter().any(|i| i.insight_id == "feedback_availability"));
    }
}
