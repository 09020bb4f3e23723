//! Shared types, configuration and error taxonomy for the User Analysis Agent core.
//!
//! Every other `uia-*` crate depends on this one for the data model (§3),
//! the top-level error kind (§7), and the layered `UiaConfig` (§6).

pub mod config;
pub mod error;
pub mod model;
pub mod textnorm;

pub use error::{ErrorKind, Result, UiaError};
