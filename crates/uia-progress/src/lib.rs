//! Per-turn progress event fan-out (C4, §4.4).

mod broker;
mod event;

pub use broker::ProgressBroker;
pub use event::{labels, ProgressEvent};
