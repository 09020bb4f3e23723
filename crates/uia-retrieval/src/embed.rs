//! Deterministic stand-in embedder.
//!
//! The originating system calls out to a `SentenceTransformer` + FAISS
//! index (§4.5 ambient detail) for the dense leg of hybrid retrieval — a
//! model and a GPU/CPU runtime this workspace has no business vendoring.
//! In its place, this hashes each document's tokens into a fixed-width
//! bag-of-words vector and L2-normalizes it, giving an inner-product
//! search over `ndarray::Array2<f32>` the same algorithmic shape (and the
//! same "L2-normalize once, cosine via dot product" property) the original
//! embedder provides, without an external model dependency.

use ndarray::{Array1, Array2};

use crate::tokenize::tokenize;

pub const EMBED_DIM: usize = 128;

/// Hash a single token into a bucket in `[0, EMBED_DIM)` via FNV-1a.
fn token_bucket(token: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in token.as_bytes() {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % EMBED_DIM as u64) as usize
}

/// Embed `text` as an L2-normalized bag-of-words vector.
pub fn embed(text: &str) -> Array1<f32> {
    let mut vec = vec![0.0f32; EMBED_DIM];
    for token in tokenize(text) {
        vec[token_bucket(&token)] += 1.0;
    }
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vec {
            *v /= norm;
        }
    }
    Array1::from_vec(vec)
}

/// Stack per-document embeddings into a dense matrix, one row per document.
pub fn embed_matrix(documents: &[String]) -> Array2<f32> {
    let mut matrix = Array2::zeros((documents.len(), EMBED_DIM));
    for (i, doc) in documents.iter().enumerate() {
        matrix.row_mut(i).assign(&embed(doc));
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_unit_length_for_nonempty_text() {
        let v = embed("machine learning pipelines");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn identical_text_embeds_identically() {
        assert_eq!(embed("data scientist"), embed("data scientist"));
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let v = embed("");
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
