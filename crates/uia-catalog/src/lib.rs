//! Segment taxonomy and insight vault catalog (C2, §4.2, §4.9).
//!
//! Holds the employment-category/skill tree and the insight vault in
//! memory, both seeded from the originating system's fixture data, and
//! exposes alias resolution plus the Stage-1 Vault Pack builder.

mod alias;
mod catalog;
pub mod error;
mod fixture;
mod vault_pack;

pub use alias::{AliasIndex, AliasIndexItem};
pub use catalog::Catalog;
pub use error::{CatalogError, Result};
pub use vault_pack::{build_vault_pack, VaultPack, VaultPackAnswer, VaultPackBatch, VaultPackInsight};
