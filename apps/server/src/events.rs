use eventcast_core::dispatch::{RealtimeEvent, RealtimePublisherTrait};
use serde_json::Value;
use tokio::sync::broadcast;

/// Envelope carrying an event name, its optional payload and the user it is
/// addressed to (`None` reaches every listener).
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: String,
    pub user_id: Option<String>,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_id: None,
            payload: None,
        }
    }

    pub fn with_payload(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            user_id: None,
            payload: Some(payload),
        }
    }

    pub fn is_for(&self, user_id: Option<&str>) -> bool {
        match (&self.user_id, user_id) {
            (None, _) => true,
            (Some(target), Some(listener)) => target == listener,
            (Some(_), None) => false,
        }
    }
}

impl From<RealtimeEvent> for ServerEvent {
    fn from(event: RealtimeEvent) -> Self {
        Self {
            name: event.name,
            user_id: event.user_id,
            payload: Some(event.payload),
        }
    }
}

/// Lightweight broadcast bus that fans out events to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // Lagging listeners are ignored to avoid blocking producers.
        let _ = self.sender.send(event);
    }
}

impl RealtimePublisherTrait for EventBus {
    fn publish(&self, event: RealtimeEvent) {
        EventBus::publish(self, ServerEvent::from(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_realtime_events_keep_their_target() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        RealtimePublisherTrait::publish(
            &bus,
            RealtimeEvent {
                name: "notification:created".to_string(),
                user_id: Some("u1".to_string()),
                payload: json!({ "unreadCount": 2 }),
            },
        );

        let event = rx.try_recv().unwrap();
        assert_eq!(event.name, "notification:created");
        assert!(event.is_for(Some("u1")));
        assert!(!event.is_for(Some("u2")));
        assert!(!event.is_for(None));
    }

    #[test]
    fn test_untargeted_events_reach_everyone() {
        let event = ServerEvent::new("broadcast:changed");
        assert!(event.is_for(None));
        assert!(event.is_for(Some("anyone")));
    }
}
