//! Wire types of the conferencing provider API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventcast_core::conference::{ConferencePayload, Registrant};

/// Scheduled conference type in the provider's API.
pub const SCHEDULED_CONFERENCE: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub conference_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
    pub start_time: DateTime<Utc>,
    pub duration: i64,
    pub timezone: String,
}

impl From<&ConferencePayload> for ConferenceRequest {
    fn from(payload: &ConferencePayload) -> Self {
        Self {
            topic: payload.topic.clone(),
            conference_type: SCHEDULED_CONFERENCE,
            agenda: payload.agenda.clone(),
            start_time: payload.start_time,
            duration: payload.duration,
            timezone: payload.timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceResponse {
    pub id: String,
    pub join_url: String,
    #[serde(default)]
    pub start_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUrlResponse {
    pub admin_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Registrant> for RegistrantRequest {
    fn from(registrant: &Registrant) -> Self {
        Self {
            email: registrant.email.clone(),
            first_name: registrant.first_name.clone(),
            last_name: registrant.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantResponse {
    #[serde(default)]
    pub registrant_id: Option<String>,
    pub join_url: String,
}
