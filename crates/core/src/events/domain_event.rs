//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::broadcasts::BroadcastKind;

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about broadcast changes. Runtime adapters
/// translate them into background work (conference pre-registration, email
/// and notification dispatch, stats recomputation, realtime pushes).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A broadcast was created as a draft.
    BroadcastCreated {
        broadcast_id: String,
        kind: BroadcastKind,
    },

    /// A broadcast went live at the conferencing provider.
    BroadcastLaunched {
        broadcast_id: String,
        kind: BroadcastKind,
    },

    /// A launched broadcast was edited.
    BroadcastUpdated {
        broadcast_id: String,
        kind: BroadcastKind,
        /// Role records created by this update
        added_role_ids: Vec<String>,
        /// Whether existing recipients should hear about the change
        notify_existing: bool,
    },

    /// A launched broadcast was cancelled.
    BroadcastCancelled {
        broadcast_id: String,
        kind: BroadcastKind,
    },

    /// A draft broadcast was deleted.
    BroadcastDeleted {
        broadcast_id: String,
        kind: BroadcastKind,
    },

    /// Launch emails were re-armed for the given role records.
    InvitationsReset {
        broadcast_id: String,
        role_ids: Vec<String>,
    },

    /// Role membership changed without a lifecycle transition (draft edits,
    /// registrations).
    MembershipChanged { broadcast_id: String },

    /// Attendance, ratings or Q&A changed.
    EngagementChanged { broadcast_id: String },
}

impl DomainEvent {
    pub fn broadcast_created(broadcast_id: String, kind: BroadcastKind) -> Self {
        Self::BroadcastCreated { broadcast_id, kind }
    }

    pub fn broadcast_launched(broadcast_id: String, kind: BroadcastKind) -> Self {
        Self::BroadcastLaunched { broadcast_id, kind }
    }

    pub fn broadcast_updated(
        broadcast_id: String,
        kind: BroadcastKind,
        added_role_ids: Vec<String>,
        notify_existing: bool,
    ) -> Self {
        Self::BroadcastUpdated {
            broadcast_id,
            kind,
            added_role_ids,
            notify_existing,
        }
    }

    pub fn broadcast_cancelled(broadcast_id: String, kind: BroadcastKind) -> Self {
        Self::BroadcastCancelled { broadcast_id, kind }
    }

    pub fn broadcast_deleted(broadcast_id: String, kind: BroadcastKind) -> Self {
        Self::BroadcastDeleted { broadcast_id, kind }
    }

    pub fn invitations_reset(broadcast_id: String, role_ids: Vec<String>) -> Self {
        Self::InvitationsReset {
            broadcast_id,
            role_ids,
        }
    }

    pub fn membership_changed(broadcast_id: String) -> Self {
        Self::MembershipChanged { broadcast_id }
    }

    pub fn engagement_changed(broadcast_id: String) -> Self {
        Self::EngagementChanged { broadcast_id }
    }

    /// The broadcast this event is about.
    pub fn broadcast_id(&self) -> &str {
        match self {
            Self::BroadcastCreated { broadcast_id, .. }
            | Self::BroadcastLaunched { broadcast_id, .. }
            | Self::BroadcastUpdated { broadcast_id, .. }
            | Self::BroadcastCancelled { broadcast_id, .. }
            | Self::BroadcastDeleted { broadcast_id, .. }
            | Self::InvitationsReset { broadcast_id, .. }
            | Self::MembershipChanged { broadcast_id }
            | Self::EngagementChanged { broadcast_id } => broadcast_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_event_serialization() {
        let event = DomainEvent::broadcast_updated(
            "b1".to_string(),
            BroadcastKind::Webinar,
            vec!["r1".to_string()],
            true,
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("broadcast_updated"));
        assert!(json.contains("\"kind\":\"webinar\""));

        let deserialized: DomainEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            DomainEvent::BroadcastUpdated {
                broadcast_id,
                added_role_ids,
                notify_existing,
                ..
            } => {
                assert_eq!(broadcast_id, "b1");
                assert_eq!(added_role_ids, vec!["r1"]);
                assert!(notify_existing);
            }
            _ => panic!("Expected BroadcastUpdated"),
        }
    }

    #[test]
    fn test_broadcast_id_accessor() {
        assert_eq!(
            DomainEvent::engagement_changed("b2".to_string()).broadcast_id(),
            "b2"
        );
        assert_eq!(
            DomainEvent::broadcast_cancelled("b3".to_string(), BroadcastKind::Webcast)
                .broadcast_id(),
            "b3"
        );
    }
}
