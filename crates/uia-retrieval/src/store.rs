//! Memoized index handle (§4.5 ambient detail).
//!
//! Building the dense matrix and the BM25 postings is a one-time, CPU-bound
//! cost. `IndexStore` builds it once behind a `tokio::sync::OnceCell` and
//! hands every caller an `Arc` to the same `RetrievalIndex`; the actual
//! search itself is still CPU-bound enough (brute-force dot products over
//! every row) that it's offloaded to the blocking thread pool rather than
//! run on the async executor.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tokio::task;
use uia_core::model::RetrievalChunk;

use crate::error::{Result, RetrievalError};
use crate::index::RetrievalIndex;

pub struct IndexStore {
    chunks: Vec<RetrievalChunk>,
    index: OnceCell<Arc<RetrievalIndex>>,
}

impl IndexStore {
    pub fn new(chunks: Vec<RetrievalChunk>) -> Self {
        Self {
            chunks,
            index: OnceCell::new(),
        }
    }

    /// Build the index on first use and memoize it; every subsequent call
    /// returns the same `Arc` without rebuilding.
    pub async fn get(&self) -> Result<Arc<RetrievalIndex>> {
        let chunks = self.chunks.clone();
        self.index
            .get_or_try_init(|| async move {
                task::spawn_blocking(move || RetrievalIndex::build(chunks))
                    .await
                    .map(Arc::new)
                    .map_err(|e| RetrievalError::BuildPanicked(e.to_string()))
            })
            .await
            .cloned()
    }

    /// Run hybrid search against the memoized index, offloaded to the
    /// blocking pool since it's a CPU-bound scan over every row.
    pub async fn hybrid_search_multi(
        &self,
        queries: Vec<String>,
        allow_docs: Option<HashSet<String>>,
        kvec: usize,
        klex: usize,
        fuse_depth: usize,
    ) -> Result<Vec<String>> {
        let index = self.get().await?;
        if index.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }
        task::spawn_blocking(move || index.hybrid_search_multi(&queries, allow_docs.as_ref(), kvec, klex, fuse_depth))
            .await
            .map_err(|e| RetrievalError::BuildPanicked(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uia_core::model::ChunkType;

    fn chunk(id: &str, doc: &str, text: &str) -> RetrievalChunk {
        RetrievalChunk {
            chunk_id: id.to_string(),
            doc_id: doc.to_string(),
            version: "v1".to_string(),
            text: text.to_string(),
            embedding_text: text.to_string(),
            section_path: vec![],
            breadcrumb: text.to_string(),
            chunk_type: ChunkType::Text,
            token_count: text.split_whitespace().count() as u32,
        }
    }

    #[tokio::test]
    async fn builds_once_and_reuses_the_same_index() {
        let store = IndexStore::new(vec![chunk("DOC01:v1:0:0:a", "DOC01", "machine learning basics")]);
        let first = store.get().await.unwrap();
        let second = store.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn hybrid_search_runs_through_the_memoized_index() {
        let store = IndexStore::new(vec![
            chunk("DOC01:v1:0:0:a", "DOC01", "machine learning deployment pipelines"),
            chunk("DOC02:v1:0:0:b", "DOC02", "cooking recipes and pasta"),
        ]);
        let results = store
            .hybrid_search_multi(vec!["machine learning".to_string()], None, 10, 10, 60)
            .await
            .unwrap();
        assert_eq!(results[0], "DOC01:v1:0:0:a");
    }

    #[tokio::test]
    async fn empty_index_is_rejected() {
        let store = IndexStore::new(vec![]);
        let err = store
            .hybrid_search_multi(vec!["anything".to_string()], None, 10, 10, 60)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::EmptyIndex));
    }
}
