mod bm25;
mod embed;
pub mod error;
mod fixture;
mod index;
mod rrf;
mod store;
mod tokenize;

pub use embed::EMBED_DIM;
pub use error::{Result, RetrievalError};
pub use fixture::seed_chunks;
pub use index::RetrievalIndex;
pub use store::IndexStore;
