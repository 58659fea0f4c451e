//! Web domain event sink implementation.
//!
//! Receives domain events and sends them to a background queue worker
//! for debounced processing.

use std::sync::Arc;

use eventcast_core::{
    broadcasts::BroadcastRepositoryTrait,
    conference::ConferenceSyncTrait,
    dispatch::DispatchServiceTrait,
    events::{DomainEvent, DomainEventSink},
    stats::StatsServiceTrait,
};
use tokio::sync::mpsc;

use super::queue_worker::{event_queue_worker, QueueWorkerDeps, RetryPolicy};
use crate::events::EventBus;

/// Domain event sink for the web server runtime.
///
/// # Two-Phase Initialization
///
/// The broadcast and engagement services need the sink, while the worker
/// needs the dispatch and stats services. So:
///
/// 1. Create the sink with `new()` - this just creates the channel
/// 2. Call `start_worker()` after all services are created - this spawns the worker
pub struct WebDomainEventSink {
    tx: mpsc::UnboundedSender<DomainEvent>,
    rx: std::sync::Mutex<Option<mpsc::UnboundedReceiver<DomainEvent>>>,
}

impl WebDomainEventSink {
    /// Events received before `start_worker()` are buffered.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            tx,
            rx: std::sync::Mutex::new(Some(rx)),
        }
    }

    /// Starts the background worker that processes events. Later calls are
    /// ignored.
    pub fn start_worker(
        &self,
        broadcasts: Arc<dyn BroadcastRepositoryTrait>,
        conference: Arc<dyn ConferenceSyncTrait>,
        dispatch: Arc<dyn DispatchServiceTrait>,
        stats: Arc<dyn StatsServiceTrait>,
        event_bus: EventBus,
        retry: RetryPolicy,
    ) {
        let rx = match self.rx.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        let Some(rx) = rx else {
            tracing::warn!("Domain event worker already started");
            return;
        };

        let deps = Arc::new(QueueWorkerDeps {
            broadcasts,
            conference,
            dispatch,
            stats,
            event_bus,
            retry,
        });

        tokio::spawn(event_queue_worker(rx, deps));
    }

    /// Creates a WebDomainEventSink with just the sender.
    #[cfg(test)]
    pub fn with_sender(tx: mpsc::UnboundedSender<DomainEvent>) -> Self {
        Self {
            tx,
            rx: std::sync::Mutex::new(None),
        }
    }
}

impl Default for WebDomainEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainEventSink for WebDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!("Failed to emit domain event: {}", e);
        }
    }
}
