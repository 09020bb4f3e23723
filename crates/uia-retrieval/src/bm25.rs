//! Hand-rolled Okapi BM25 (§4.5), the Rust replacement for `rank_bm25.BM25Okapi`.
//!
//! Same `k1=1.5`, `b=0.75` constants as the originating system. Uses the
//! standard Lucene-style smoothed IDF (`ln(1 + (N - df + 0.5)/(df + 0.5))`,
//! always non-negative) rather than `rank_bm25`'s epsilon-clamped negative-IDF
//! handling — the two agree on ranking order for any corpus where no term
//! appears in more than half the documents, which the demo corpus satisfies.

use std::collections::HashMap;

use crate::tokenize::tokenize;

const K1: f32 = 1.5;
const B: f32 = 0.75;

pub struct Bm25Index {
    /// Per-document term frequency tables, in corpus order.
    doc_term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<u32>,
    avg_doc_len: f32,
    /// Document frequency per term across the whole corpus.
    doc_freq: HashMap<String, u32>,
    n_docs: usize,
}

impl Bm25Index {
    pub fn build(documents: &[String]) -> Self {
        let mut doc_term_freqs = Vec::with_capacity(documents.len());
        let mut doc_lens = Vec::with_capacity(documents.len());
        let mut doc_freq: HashMap<String, u32> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc);
            doc_lens.push(tokens.len() as u32);

            let mut tf: HashMap<String, u32> = HashMap::new();
            for t in &tokens {
                *tf.entry(t.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            doc_term_freqs.push(tf);
        }

        let n_docs = documents.len();
        let avg_doc_len = if n_docs == 0 {
            0.0
        } else {
            doc_lens.iter().sum::<u32>() as f32 / n_docs as f32
        };

        Self {
            doc_term_freqs,
            doc_lens,
            avg_doc_len,
            doc_freq,
            n_docs,
        }
    }

    fn idf(&self, term: &str) -> f32 {
        let df = *self.doc_freq.get(term).unwrap_or(&0) as f32;
        let n = self.n_docs as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Score every document in the corpus against `query`, in corpus order.
    pub fn get_scores(&self, query: &str) -> Vec<f32> {
        let query_tokens = tokenize(query);
        let mut scores = vec![0.0f32; self.n_docs];

        for term in &query_tokens {
            if !self.doc_freq.contains_key(term) {
                continue;
            }
            let idf = self.idf(term);
            for (i, tf_map) in self.doc_term_freqs.iter().enumerate() {
                let f = *tf_map.get(term).unwrap_or(&0) as f32;
                if f == 0.0 {
                    continue;
                }
                let doc_len = self.doc_lens[i] as f32;
                let denom = f + K1 * (1.0 - B + B * doc_len / self.avg_doc_len.max(1.0));
                scores[i] += idf * (f * (K1 + 1.0)) / denom;
            }
        }
        scores
    }

    /// Top-`topk` `(doc_index, score)` pairs, descending by score.
    pub fn top_k(&self, query: &str, topk: usize) -> Vec<(usize, f32)> {
        let scores = self.get_scores(query);
        let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(topk);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_present_only_in_one_doc_ranks_it_first() {
        let docs = vec![
            "machine learning and deep learning pipelines".to_string(),
            "cooking pasta with tomato sauce".to_string(),
            "deploying ml models to production".to_string(),
        ];
        let bm25 = Bm25Index::build(&docs);
        let top = bm25.top_k("deploy ml production", 3);
        assert_eq!(top[0].0, 2);
    }

    #[test]
    fn unknown_query_terms_yield_zero_scores() {
        let docs = vec!["alpha beta gamma".to_string()];
        let bm25 = Bm25Index::build(&docs);
        let scores = bm25.get_scores("zzz yyy");
        assert_eq!(scores, vec![0.0]);
    }
}
