//! Alias resolution for free-text category/skill mentions.
//!
//! Grounded on `seed_vault.py::build_alias_index` and `models/alias.py`'s
//! `AliasIndexItem`: every employment category's name + declared aliases,
//! and every skill's name + declared aliases (scoped to its owning
//! category), are normalized once and indexed for lookup.

use std::collections::HashMap;

use uia_core::model::EmploymentCategory;
use uia_core::textnorm::normalize;

#[derive(Debug, Clone)]
pub struct AliasIndexItem {
    pub alias: String,
    pub alias_norm: String,
    pub target_id: String,
    /// `None` for a category alias; the owning category for a skill alias.
    pub employment_category_id: Option<String>,
}

/// Normalized-alias -> candidate matches. A normalized form may legitimately
/// collide across categories (e.g. two categories both aliased "data"), so
/// lookups return all candidates and callers disambiguate by scope.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    categories: HashMap<String, Vec<AliasIndexItem>>,
    skills: HashMap<String, Vec<AliasIndexItem>>,
}

impl AliasIndex {
    pub fn build(categories: &[EmploymentCategory]) -> Self {
        let mut index = AliasIndex::default();

        for ec in categories {
            let mut seen_ec = std::collections::HashSet::new();
            for alias in std::iter::once(ec.name.clone()).chain(ec.aliases.iter().cloned()) {
                let norm = normalize(&alias);
                if norm.is_empty() || !seen_ec.insert(norm.clone()) {
                    continue;
                }
                index.categories.entry(norm.clone()).or_default().push(AliasIndexItem {
                    alias,
                    alias_norm: norm,
                    target_id: ec.id.clone(),
                    employment_category_id: None,
                });
            }

            for sk in &ec.skills {
                let mut seen_sk = std::collections::HashSet::new();
                for alias in std::iter::once(sk.name.clone()).chain(sk.aliases.iter().cloned()) {
                    let norm = normalize(&alias);
                    if norm.is_empty() || !seen_sk.insert(norm.clone()) {
                        continue;
                    }
                    index.skills.entry(norm.clone()).or_default().push(AliasIndexItem {
                        alias,
                        alias_norm: norm,
                        target_id: sk.id.clone(),
                        employment_category_id: Some(ec.id.clone()),
                    });
                }
            }
        }

        index
    }

    /// Resolve free text to a category id via exact normalized-alias match.
    pub fn resolve_category(&self, text: &str) -> Option<String> {
        let norm = normalize(text);
        self.categories.get(&norm).and_then(|v| v.first()).map(|i| i.target_id.clone())
    }

    /// Resolve free text to a skill id, optionally scoped to one category.
    pub fn resolve_skill(&self, text: &str, category_id: Option<&str>) -> Option<String> {
        let norm = normalize(text);
        let candidates = self.skills.get(&norm)?;
        let matched = match category_id {
            Some(cid) => candidates.iter().find(|i| i.employment_category_id.as_deref() == Some(cid)),
            None => candidates.first(),
        };
        matched.map(|i| i.target_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_core::model::Skill;

    fn fixture() -> Vec<EmploymentCategory> {
        vec![EmploymentCategory {
            id: "ec_ds".to_string(),
            name: "Data Scientist".to_string(),
            description: None,
            aliases: vec!["data scientist".to_string(), "DS".to_string()],
            skills: vec![Skill {
                id: "sk_prog_wrangling".to_string(),
                name: "Programming & data wrangling".to_string(),
                description: None,
                aliases: vec!["python".to_string(), "pandas".to_string()],
            }],
        }]
    }

    #[test]
    fn resolves_category_by_alias() {
        let idx = AliasIndex::build(&fixture());
        assert_eq!(idx.resolve_category("ds"), Some("ec_ds".to_string()));
        assert_eq!(idx.resolve_category("  Data   Scientist! "), Some("ec_ds".to_string()));
    }

    #[test]
    fn resolves_skill_scoped_to_category() {
        let idx = AliasIndex::build(&fixture());
        assert_eq!(
            idx.resolve_skill("python", Some("ec_ds")),
            Some("sk_prog_wrangling".to_string())
        );
        assert_eq!(idx.resolve_skill("python", Some("ec_other")), None);
    }

    #[test]
    fn unknown_alias_resolves_to_none() {
        let idx = AliasIndex::build(&fixture());
        assert_eq!(idx.resolve_category("astronaut"), None);
    }
}
