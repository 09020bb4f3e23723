//! Durable per-chat state (C3, §4.3).
//!
//! Backs `ChatUIAState`, `ChatInsightSession` and `ChatInsightState` with a
//! `rusqlite` connection, the way `skynet-sessions` backs `Session` — a
//! single connection behind a `Mutex`, idempotent `INSERT ... ON CONFLICT`
//! upserts throughout, no separate migration runner.

mod db;
pub mod error;
mod store;

pub use db::init_db;
pub use error::{Result, StateError};
pub use store::ChatStateStore;
