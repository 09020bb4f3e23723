//! Step 2: Retrieve (§4.6). Runs the hybrid retriever (C5) over the
//! planned sub-queries; an empty or failed retrieval degrades to a
//! conservative `used=false` result rather than aborting the turn.

use std::collections::HashSet;

use tracing::warn;
use uia_core::config::{DEFAULT_FUSION_DEPTH, DEFAULT_RETRIEVAL_TOP_K};
use uia_retrieval::IndexStore;

use crate::types::{Candidate, RagPlan};

/// Run C5 over `plan`'s sub-queries, resolving each returned chunk id back
/// into a `Candidate` via the index. Never propagates a hard error: an
/// empty index or a retrieval task failure both degrade to `vec![]`.
pub async fn retrieve(store: &IndexStore, plan: &RagPlan, doc_filters: Option<HashSet<String>>) -> Vec<Candidate> {
    let allow = merge_doc_filters(doc_filters, &plan.doc_filters);

    let chunk_ids = match store
        .hybrid_search_multi(plan.queries.clone(), allow, DEFAULT_RETRIEVAL_TOP_K, DEFAULT_RETRIEVAL_TOP_K, DEFAULT_FUSION_DEPTH)
        .await
    {
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %e, "retrieval degraded to empty result");
            return Vec::new();
        }
    };

    let Ok(index) = store.get().await else {
        return Vec::new();
    };

    chunk_ids
        .into_iter()
        .filter_map(|cid| {
            index.chunk(&cid).map(|c| Candidate {
                chunk_id: c.chunk_id.clone(),
                breadcrumb: c.breadcrumb.clone(),
                text: c.text.clone(),
            })
        })
        .collect()
}

fn merge_doc_filters(caller: Option<HashSet<String>>, planner: &[String]) -> Option<HashSet<String>> {
    if planner.is_empty() {
        return caller;
    }
    let mut merged = caller.unwrap_or_default();
    merged.extend(planner.iter().cloned());
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_retrieval::seed_chunks;

    #[tokio::test]
    async fn retrieves_candidates_for_a_relevant_plan() {
        let store = IndexStore::new(seed_chunks());
        let plan = RagPlan::fallback("how do I learn machine learning fundamentals?");
        let candidates = retrieve(&store, &plan, None).await;
        assert!(!candidates.is_empty());
    }

    #[tokio::test]
    async fn empty_index_degrades_to_empty_result() {
        let store = IndexStore::new(vec![]);
        let plan = RagPlan::fallback("anything");
        let candidates = retrieve(&store, &plan, None).await;
        assert!(candidates.is_empty());
    }
}
