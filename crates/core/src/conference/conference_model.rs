use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::broadcasts::Broadcast;

/// Conference fields sent to the provider on create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferencePayload {
    pub topic: String,
    pub agenda: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: i64,
    pub timezone: String,
}

impl From<&Broadcast> for ConferencePayload {
    fn from(broadcast: &Broadcast) -> Self {
        Self {
            topic: broadcast.title.clone(),
            agenda: broadcast.description.clone(),
            start_time: broadcast.start_at,
            end_time: broadcast.end_at,
            duration: broadcast.duration_minutes(),
            timezone: "UTC".to_string(),
        }
    }
}

/// Provider response to a create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceDetails {
    pub conference_id: String,
    pub conference_address: String,
    pub presenter_url: Option<String>,
}

/// Everything a broadcast stores about its conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceLinks {
    pub conference_id: String,
    pub join_url: String,
    pub presenter_url: Option<String>,
    pub admin_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Outcome of a pre-registration pass. Role ids that failed carry the reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreRegistrationReport {
    pub registered: Vec<String>,
    pub failed: Vec<(String, String)>,
}
