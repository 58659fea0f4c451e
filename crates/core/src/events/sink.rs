//! Hand-off point between the broadcast services and background work.

use std::sync::{Arc, Mutex};

use super::DomainEvent;

/// Receives broadcast events once the triggering write has committed.
///
/// `BroadcastService` and `EngagementService` call `emit` after their
/// repository call returns. The server's sink pushes onto the queue drained
/// by the debounced worker, which turns launches and updates into conference
/// pre-registration and email/notification dispatch, and engagement changes
/// into a stats recompute. `emit` runs inside the request path, so it only
/// enqueues; a dropped event never fails the mutation that produced it.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// Records emitted events in order for service tests.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events that concern one broadcast, oldest first.
    pub fn events_for(&self, broadcast_id: &str) -> Vec<DomainEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.broadcast_id() == broadcast_id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcasts::BroadcastKind;

    #[test]
    fn test_events_for_filters_by_broadcast() {
        let sink = MockDomainEventSink::new();
        sink.emit(DomainEvent::broadcast_launched("b1".to_string(), BroadcastKind::Webinar));
        sink.emit(DomainEvent::engagement_changed("b2".to_string()));
        sink.emit(DomainEvent::invitations_reset("b1".to_string(), vec!["r1".to_string()]));

        let b1 = sink.events_for("b1");

        assert_eq!(
            b1,
            vec![
                DomainEvent::broadcast_launched("b1".to_string(), BroadcastKind::Webinar),
                DomainEvent::invitations_reset("b1".to_string(), vec!["r1".to_string()]),
            ]
        );
        assert_eq!(sink.events_for("b2").len(), 1);
        assert!(sink.events_for("b3").is_empty());
    }

    #[test]
    fn test_clear_drops_recorded_events() {
        let sink = MockDomainEventSink::new();
        sink.emit(DomainEvent::membership_changed("b1".to_string()));
        assert!(!sink.is_empty());

        sink.clear();

        assert!(sink.is_empty());
        assert!(sink.events().is_empty());
    }
}
