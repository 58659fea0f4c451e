//! Dispatch domain models: outbound email, notifications, push and realtime messages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::roles::{EmailStatus, RoleKind, RoleRecord};

/// Kind of communication batch sent for a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchVariant {
    Launch,
    InviteeAdded,
    Update,
    Cancel,
}

impl DispatchVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchVariant::Launch => "LAUNCH",
            DispatchVariant::InviteeAdded => "INVITEE_ADDED",
            DispatchVariant::Update => "UPDATE",
            DispatchVariant::Cancel => "CANCEL",
        }
    }

    /// Gated variants only reach `NOT_SENT` records and mark them `SENT`.
    /// The others are one-shot batches.
    pub fn is_gated(&self) -> bool {
        matches!(self, DispatchVariant::Launch | DispatchVariant::InviteeAdded)
    }

    pub fn target_roles(&self) -> &'static [RoleKind] {
        match self {
            DispatchVariant::Launch | DispatchVariant::InviteeAdded => {
                &[RoleKind::Host, RoleKind::Participant, RoleKind::Invitee]
            }
            DispatchVariant::Update => &[
                RoleKind::Host,
                RoleKind::Participant,
                RoleKind::Invitee,
                RoleKind::Rsvp,
            ],
            DispatchVariant::Cancel => &[RoleKind::Invitee],
        }
    }

    /// Whether `record` belongs in a batch of this variant.
    pub fn selects(&self, record: &RoleRecord) -> bool {
        self.target_roles().contains(&record.role)
            && (!self.is_gated() || record.email_status == EmailStatus::NotSent)
    }
}

impl fmt::Display for DispatchVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LAUNCH" => Ok(DispatchVariant::Launch),
            "INVITEE_ADDED" => Ok(DispatchVariant::InviteeAdded),
            "UPDATE" => Ok(DispatchVariant::Update),
            "CANCEL" => Ok(DispatchVariant::Cancel),
            other => Err(Error::Unexpected(format!("Unknown dispatch variant '{}'", other))),
        }
    }
}

/// Which role records of a broadcast a batch covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "roleIds", rename_all = "camelCase")]
pub enum DispatchScope {
    #[default]
    All,
    Only(Vec<String>),
    Except(Vec<String>),
}

impl DispatchScope {
    pub fn includes(&self, role_id: &str) -> bool {
        match self {
            DispatchScope::All => true,
            DispatchScope::Only(ids) => ids.iter().any(|id| id == role_id),
            DispatchScope::Except(ids) => !ids.iter().any(|id| id == role_id),
        }
    }
}

/// A role record resolved to a deliverable address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub role_id: String,
    pub role: RoleKind,
    pub user_id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub conference_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarMethod {
    Request,
    Cancel,
}

/// An iCalendar invitation attached to broadcast emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInvite {
    pub method: CalendarMethod,
    pub uid: String,
    pub sequence: i64,
    pub summary: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: Option<String>,
    pub organizer_email: String,
    pub organizer_name: Option<String>,
    pub attendee_email: String,
    pub stamp: DateTime<Utc>,
}

impl CalendarInvite {
    /// Renders the invite as an RFC 5545 document with CRLF line endings.
    pub fn to_ics(&self) -> String {
        let method = match self.method {
            CalendarMethod::Request => "REQUEST",
            CalendarMethod::Cancel => "CANCEL",
        };
        let status = match self.method {
            CalendarMethod::Request => "CONFIRMED",
            CalendarMethod::Cancel => "CANCELLED",
        };
        let organizer = match &self.organizer_name {
            Some(name) => format!("ORGANIZER;CN={}:mailto:{}", ics_escape(name), self.organizer_email),
            None => format!("ORGANIZER:mailto:{}", self.organizer_email),
        };

        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//Eventcast//Broadcasts//EN".to_string(),
            format!("METHOD:{}", method),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("SEQUENCE:{}", self.sequence),
            format!("DTSTAMP:{}", ics_time(self.stamp)),
            format!("DTSTART:{}", ics_time(self.start_at)),
            format!("DTEND:{}", ics_time(self.end_at)),
            format!("SUMMARY:{}", ics_escape(&self.summary)),
        ];
        if let Some(description) = &self.description {
            lines.push(format!("DESCRIPTION:{}", ics_escape(description)));
        }
        if let Some(location) = &self.location {
            lines.push(format!("LOCATION:{}", ics_escape(location)));
        }
        lines.push(organizer);
        lines.push(format!(
            "ATTENDEE;ROLE=REQ-PARTICIPANT;RSVP=TRUE:mailto:{}",
            self.attendee_email
        ));
        lines.push(format!("STATUS:{}", status));
        lines.push("END:VEVENT".to_string());
        lines.push("END:VCALENDAR".to_string());

        let mut out = lines.join("\r\n");
        out.push_str("\r\n");
        out
    }

    pub fn content_type(&self) -> String {
        let method = match self.method {
            CalendarMethod::Request => "REQUEST",
            CalendarMethod::Cancel => "CANCEL",
        };
        format!("text/calendar; charset=utf-8; method={}", method)
    }
}

fn ics_time(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

fn ics_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// SMTP credentials overriding the transport defaults for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEmail {
    pub subject: String,
    pub from: String,
    pub to: String,
    pub cc: Vec<String>,
    pub text_body: String,
    pub html_body: Option<String>,
    pub attachments: Vec<EmailAttachment>,
    pub calendar: Option<CalendarInvite>,
    pub credentials: Option<MailCredentials>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub user_id: String,
    pub broadcast_id: String,
    pub variant: DispatchVariant,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,
    pub broadcast_id: String,
    pub variant: DispatchVariant,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub tokens: Vec<String>,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

/// A message for connected realtime clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeEvent {
    pub name: String,
    pub user_id: Option<String>,
    pub payload: serde_json::Value,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub sent: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Configuration of the dispatch tracker.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub from_address: String,
    pub lease_duration: Duration,
    pub credentials: Option<MailCredentials>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            from_address: crate::constants::DEFAULT_FROM_ADDRESS.to_string(),
            lease_duration: Duration::seconds(crate::constants::DEFAULT_DISPATCH_LEASE_SECS),
            credentials: None,
        }
    }
}
