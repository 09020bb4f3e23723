use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Text,
    Table,
    Code,
}

/// Offline-produced, read-only chunk record (§3, §6 `meta.jsonl`).
///
/// `chunk_id` encodes `docId:version:blockRange:index:shortHash` — the
/// `docId` prefix (substring before the first `:`) is what the retriever's
/// document allowlist filters against (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalChunk {
    pub chunk_id: String,
    pub doc_id: String,
    pub version: String,
    pub text: String,
    pub embedding_text: String,
    pub section_path: Vec<String>,
    pub breadcrumb: String,
    pub chunk_type: ChunkType,
    pub token_count: u32,
}

impl RetrievalChunk {
    /// The `docId` prefix of a `chunkId`, used by the document allowlist filter.
    pub fn doc_id_of(chunk_id: &str) -> &str {
        chunk_id.split(':').next().unwrap_or(chunk_id)
    }
}
