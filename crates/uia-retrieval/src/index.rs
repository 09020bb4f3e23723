use std::collections::{HashMap, HashSet};

use ndarray::Array2;

use uia_core::model::RetrievalChunk;

use crate::bm25::Bm25Index;
use crate::embed::{embed, embed_matrix};
use crate::rrf::rrf_fuse;

/// In-memory hybrid retrieval index (C5, §4.5): a dense `ndarray::Array2<f32>`
/// matrix searched by brute-force inner product, plus a BM25 lexical index,
/// fused per sub-query via RRF.
pub struct RetrievalIndex {
    chunks: Vec<RetrievalChunk>,
    chunk_id_to_row: HashMap<String, usize>,
    dense: Array2<f32>,
    bm25: Bm25Index,
}

impl RetrievalIndex {
    pub fn build(chunks: Vec<RetrievalChunk>) -> Self {
        let documents: Vec<String> = chunks.iter().map(|c| c.embedding_text.clone()).collect();
        let dense = embed_matrix(&documents);
        let bm25 = Bm25Index::build(&documents);
        let chunk_id_to_row = chunks.iter().enumerate().map(|(i, c)| (c.chunk_id.clone(), i)).collect();

        Self {
            chunks,
            chunk_id_to_row,
            dense,
            bm25,
        }
    }

    pub fn chunk(&self, chunk_id: &str) -> Option<&RetrievalChunk> {
        self.chunk_id_to_row.get(chunk_id).map(|&i| &self.chunks[i])
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Brute-force inner-product search; rows are L2-normalized so this is cosine.
    fn vec_search(&self, query: &str, topk: usize) -> Vec<(String, usize)> {
        let qvec = embed(query);
        let sims = self.dense.dot(&qvec);
        let mut ranked: Vec<(usize, f32)> = sims.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
            .into_iter()
            .take(topk)
            .enumerate()
            .map(|(rank, (row, _score))| (self.chunks[row].chunk_id.clone(), rank + 1))
            .collect()
    }

    fn bm25_search(&self, query: &str, topk: usize) -> Vec<(String, usize)> {
        self.bm25
            .top_k(query, topk)
            .into_iter()
            .enumerate()
            .map(|(rank, (row, _score))| (self.chunks[row].chunk_id.clone(), rank + 1))
            .collect()
    }

    /// Pool the dense+BM25 RRF fusion across every sub-query (§4.5), applying
    /// the `allow_docs` document-prefix allowlist to each source list before
    /// fusing. Returns chunk ids ranked by pooled fused score, descending.
    pub fn hybrid_search_multi(
        &self,
        queries: &[String],
        allow_docs: Option<&HashSet<String>>,
        kvec: usize,
        klex: usize,
        fuse_depth: usize,
    ) -> Vec<String> {
        let mut pooled: HashMap<String, f32> = HashMap::new();

        for q in queries {
            let vec_ranks = self.filtered_ranks(self.vec_search(q, kvec), allow_docs);
            let bm25_ranks = self.filtered_ranks(self.bm25_search(q, klex), allow_docs);
            let fused = rrf_fuse(&[vec_ranks, bm25_ranks], fuse_depth);
            for (cid, score) in fused {
                *pooled.entry(cid).or_insert(0.0) += score;
            }
        }

        let mut ranked: Vec<(String, f32)> = pooled.into_iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().map(|(cid, _)| cid).collect()
    }

    fn filtered_ranks(&self, pairs: Vec<(String, usize)>, allow_docs: Option<&HashSet<String>>) -> HashMap<String, usize> {
        pairs
            .into_iter()
            .filter(|(cid, _)| match allow_docs {
                Some(docs) => docs.contains(RetrievalChunk::doc_id_of(cid)),
                None => true,
            })
            .collect()
    }
}
