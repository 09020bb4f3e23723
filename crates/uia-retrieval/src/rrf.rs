//! Reciprocal-rank fusion, ported from `component8_rag.py::rrf_fuse`.

use std::collections::HashMap;

/// `score[id] = Σ 1/(k + rank)` across every source's rank list (1-indexed
/// ranks). Sources that don't mention an id simply don't contribute.
pub fn rrf_fuse(rank_lists: &[HashMap<String, usize>], k: usize) -> HashMap<String, f32> {
    let mut scores: HashMap<String, f32> = HashMap::new();
    for ranks in rank_lists {
        for (id, rank) in ranks {
            *scores.entry(id.clone()).or_insert(0.0) += 1.0 / (k + rank) as f32;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuses_and_sums_across_sources() {
        let vec_ranks: HashMap<String, usize> = [("a".to_string(), 1), ("b".to_string(), 2)].into();
        let bm25_ranks: HashMap<String, usize> = [("a".to_string(), 3), ("c".to_string(), 1)].into();
        let fused = rrf_fuse(&[vec_ranks, bm25_ranks], 60);
        let a = fused["a"];
        let expected_a = 1.0 / 61.0 + 1.0 / 63.0;
        assert!((a - expected_a).abs() < 1e-6);
        assert_eq!(fused.len(), 3);
    }
}
