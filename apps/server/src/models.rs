//! Request bodies of the HTTP API that do not map one-to-one onto core inputs.

use chrono::{DateTime, Utc};
use eventcast_core::{
    audience::AudienceRequest,
    broadcasts::{BroadcastKind, FileRef, NewBroadcast, Visibility},
    roles::RoleKind,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /{kind}`; the kind comes from the path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBroadcastRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub launch: bool,
    #[serde(default)]
    pub cc_emails: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileRef>,
    #[serde(default)]
    pub audience: AudienceRequest,
}

impl CreateBroadcastRequest {
    pub fn into_new(self, kind: BroadcastKind) -> NewBroadcast {
        NewBroadcast {
            kind,
            title: self.title,
            description: self.description,
            start_at: self.start_at,
            end_at: self.end_at,
            visibility: self.visibility,
            launch: self.launch,
            cc_emails: self.cc_emails,
            files: self.files,
            audience: self.audience,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    /// Role records to re-arm; every launch recipient when absent.
    pub role_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendResponse {
    pub reset_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub role: RoleKind,
    pub ordered_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub rating: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeRequest {
    pub email: String,
    pub kind: BroadcastKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_takes_kind_from_path() {
        let body = json!({
            "title": "Quarterly review",
            "startAt": "2026-11-03T16:00:00Z",
            "endAt": "2026-11-03T17:00:00Z",
            "audience": { "hosts": [{ "type": "internal", "userId": "u2" }] }
        });
        let request: CreateBroadcastRequest = serde_json::from_value(body).unwrap();
        let new_broadcast = request.into_new(BroadcastKind::Webcast);

        assert_eq!(new_broadcast.kind, BroadcastKind::Webcast);
        assert!(!new_broadcast.launch);
        assert_eq!(new_broadcast.audience.hosts.len(), 1);
        assert!(new_broadcast.cc_emails.is_empty());
    }

    #[test]
    fn test_reorder_request_uses_role_labels() {
        let request: ReorderRequest = serde_json::from_value(json!({
            "role": "PARTICIPANT",
            "orderedIds": ["r2", "r1"]
        }))
        .unwrap();
        assert_eq!(request.role, RoleKind::Participant);
    }
}
