//! Per-request progress fan-out (C4, §4.4).
//!
//! Grounded on the originating system's `ProgressBroker` (one `asyncio.Queue`
//! per request id, TTL-swept every 60s) crossed with
//! `skynet-agent::HealthTracker`'s lock-free `DashMap` concurrency pattern.
//! `publish` is a best-effort, non-blocking send (P9): a full or absent
//! queue never stalls the caller's turn.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

use uia_core::config::{PROGRESS_GC_INTERVAL_SECS, PROGRESS_QUEUE_TTL_SECS};

use crate::event::ProgressEvent;

/// Bounded per-request channel capacity. Generous relative to a single
/// turn's event count (§4.11 lists ~12 stages) so `try_send` practically
/// never drops; it exists purely as a backstop against a stalled consumer.
const QUEUE_CAPACITY: usize = 256;

struct QueueEntry {
    sender: mpsc::Sender<ProgressEvent>,
    receiver: Mutex<Option<mpsc::Receiver<ProgressEvent>>>,
    last_touched: Mutex<Instant>,
}

impl QueueEntry {
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            last_touched: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_touched.lock().unwrap() = Instant::now();
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_touched.lock().unwrap().elapsed() > ttl
    }
}

/// Concurrent, lock-free progress event broker.
pub struct ProgressBroker {
    queues: DashMap<String, QueueEntry>,
}

impl ProgressBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queues: DashMap::new(),
        })
    }

    /// Publish an event for `request_id`. Best-effort: creates the queue on
    /// first use, never blocks, and silently drops the event (with a
    /// warning) if the consumer has fallen behind or never subscribed and
    /// the channel capacity is exhausted.
    pub fn publish(&self, request_id: &str, label: impl Into<String>, detail: Option<String>) {
        if request_id.is_empty() {
            return;
        }
        let event = ProgressEvent::new(request_id, label, detail);
        let entry = self.queues.entry(request_id.to_string()).or_insert_with(QueueEntry::new);
        entry.touch();
        if let Err(e) = entry.sender.try_send(event) {
            warn!(request_id, error = %e, "progress event dropped");
        }
    }

    /// Subscribe to `request_id`'s event stream. Returns `None` if the
    /// queue already has a live subscriber (single-consumer, matching the
    /// originating system's one-`asyncio.Queue`-per-request model).
    pub fn subscribe(&self, request_id: &str) -> Option<impl Stream<Item = ProgressEvent> + Send + 'static> {
        let entry = self.queues.entry(request_id.to_string()).or_insert_with(QueueEntry::new);
        entry.touch();
        let receiver = entry.receiver.lock().unwrap().take()?;
        Some(ReceiverStream::new(receiver))
    }

    /// Explicitly tear down a request's queue once the turn has finished.
    pub fn close(&self, request_id: &str) {
        self.queues.remove(request_id);
    }

    /// Background sweep: remove queues untouched for longer than the TTL.
    /// Intended to run as a long-lived `tokio::spawn`ed task for the
    /// process lifetime.
    pub async fn run_gc_loop(self: Arc<Self>) {
        let ttl = Duration::from_secs(PROGRESS_QUEUE_TTL_SECS);
        let mut interval = tokio::time::interval(Duration::from_secs(PROGRESS_GC_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let expired: Vec<String> = self
                .queues
                .iter()
                .filter(|e| e.value().is_expired(ttl))
                .map(|e| e.key().clone())
                .collect();
            for rid in &expired {
                self.queues.remove(rid);
            }
            if !expired.is_empty() {
                debug!(count = expired.len(), "progress gc swept expired queues");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn publish_then_subscribe_replays_buffered_events() {
        let broker = ProgressBroker::new();
        broker.publish("req-1", "1.0 received", None);
        broker.publish("req-1", "2.0 scope_gate", Some("proceed".to_string()));

        let mut stream = broker.subscribe("req-1").expect("first subscriber");
        let first = stream.next().await.unwrap();
        let second = stream.next().await.unwrap();
        assert_eq!(first.label, "1.0 received");
        assert_eq!(second.label, "2.0 scope_gate");
    }

    #[tokio::test]
    async fn second_subscriber_gets_none() {
        let broker = ProgressBroker::new();
        let _first = broker.subscribe("req-2");
        assert!(broker.subscribe("req-2").is_none());
    }

    #[tokio::test]
    async fn publish_before_any_subscriber_does_not_block() {
        let broker = ProgressBroker::new();
        for i in 0..10 {
            broker.publish("req-3", format!("stage-{i}"), None);
        }
        // No subscriber ever attached; publish must still return promptly.
    }

    #[test]
    fn close_removes_queue() {
        let broker = ProgressBroker::new();
        broker.publish("req-4", "1.0 received", None);
        broker.close("req-4");
        assert!(broker.queues.get("req-4").is_none());
    }
}
