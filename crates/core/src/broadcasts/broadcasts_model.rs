//! Broadcast (webcast/webinar) domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audience::AudienceRequest;
use crate::conference::ConferenceLinks;
use crate::errors::{Error, FieldErrors, Result, ValidationError};
use crate::roles::RoleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastKind {
    Webcast,
    Webinar,
}

impl BroadcastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastKind::Webcast => "webcast",
            BroadcastKind::Webinar => "webinar",
        }
    }

    /// Human label used in message subjects.
    pub fn label(&self) -> &'static str {
        match self {
            BroadcastKind::Webcast => "Webcast",
            BroadcastKind::Webinar => "Webinar",
        }
    }
}

impl fmt::Display for BroadcastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "webcast" | "webcasts" => Ok(BroadcastKind::Webcast),
            "webinar" | "webinars" => Ok(BroadcastKind::Webinar),
            other => Err(Error::NotFound(format!("Unknown broadcast kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(Error::Unexpected(format!("Unknown visibility '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastState {
    Draft,
    Launched,
    Cancelled,
}

/// A file attached to a broadcast by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub name: String,
    pub url: String,
    pub content_type: Option<String>,
}

/// Aggregate root of the broadcast subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    pub id: String,
    pub kind: BroadcastKind,
    pub account_id: String,
    pub creator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub visibility: Visibility,
    pub is_draft: bool,
    pub is_cancelled: bool,
    pub in_process: bool,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub creator_notified: bool,
    pub conference_id: Option<String>,
    pub join_url: Option<String>,
    pub admin_url: Option<String>,
    pub presenter_url: Option<String>,
    pub cc_emails: Vec<String>,
    pub files: Vec<FileRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Broadcast {
    pub fn state(&self) -> BroadcastState {
        if self.is_cancelled {
            BroadcastState::Cancelled
        } else if self.is_draft {
            BroadcastState::Draft
        } else {
            BroadcastState::Launched
        }
    }

    pub fn is_launched(&self) -> bool {
        self.state() == BroadcastState::Launched
    }

    /// Length of the schedule window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_at - self.start_at).num_minutes()
    }

    pub fn apply_conference(&mut self, links: ConferenceLinks) {
        self.conference_id = Some(links.conference_id);
        self.join_url = Some(links.join_url);
        self.presenter_url = links.presenter_url;
        self.admin_url = links.admin_url;
    }
}

/// Input for creating a broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBroadcast {
    pub kind: BroadcastKind,
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

impl NewBroadcast {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();
        validate_fields(
            &mut errors,
            self.kind,
            &self.title,
            self.start_at,
            self.end_at,
            self.visibility.unwrap_or_default(),
            &self.cc_emails,
        );
        errors.into_result()
    }
}

/// Partial update of a broadcast. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub visibility: Option<Visibility>,
    pub cc_emails: Option<Vec<String>>,
    pub files: Option<Vec<FileRef>>,
    pub audience: Option<AudienceRequest>,
    /// Flips a draft to launched.
    #[serde(default)]
    pub launch: bool,
}

impl BroadcastUpdate {
    /// Applies the field changes to `broadcast` and validates the result.
    pub fn apply_to(&self, broadcast: &mut Broadcast) -> Result<()> {
        if let Some(title) = &self.title {
            broadcast.title = title.clone();
        }
        if let Some(description) = &self.description {
            broadcast.description = Some(description.clone());
        }
        if let Some(start_at) = self.start_at {
            broadcast.start_at = start_at;
        }
        if let Some(end_at) = self.end_at {
            broadcast.end_at = end_at;
        }
        if let Some(visibility) = self.visibility {
            broadcast.visibility = visibility;
        }
        if let Some(cc_emails) = &self.cc_emails {
            broadcast.cc_emails = cc_emails.clone();
        }
        if let Some(files) = &self.files {
            broadcast.files = files.clone();
        }

        let mut errors = FieldErrors::default();
        validate_fields(
            &mut errors,
            broadcast.kind,
            &broadcast.title,
            broadcast.start_at,
            broadcast.end_at,
            broadcast.visibility,
            &broadcast.cc_emails,
        );
        errors.into_result()
    }
}

fn validate_fields(
    errors: &mut FieldErrors,
    kind: BroadcastKind,
    title: &str,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    visibility: Visibility,
    cc_emails: &[String],
) {
    if title.trim().is_empty() {
        errors.add("title", "Title cannot be empty");
    }
    if end_at <= start_at {
        errors.add("endAt", "End time must be after start time");
    }
    if kind == BroadcastKind::Webcast && visibility == Visibility::Public {
        errors.add("visibility", "Webcasts are always private");
    }
    for email in cc_emails {
        if !email.contains('@') {
            errors.add("ccEmails", format!("Invalid email '{}'", email));
        }
    }
}

/// Role records of a broadcast grouped by role, sequenced roles in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastAttendees {
    pub hosts: Vec<RoleRecord>,
    pub participants: Vec<RoleRecord>,
    pub invitees: Vec<RoleRecord>,
    pub rsvps: Vec<RoleRecord>,
}

impl BroadcastAttendees {
    pub fn from_records(records: Vec<RoleRecord>) -> Self {
        use crate::roles::RoleKind;

        let mut attendees = BroadcastAttendees::default();
        for record in records {
            match record.role {
                RoleKind::Host => attendees.hosts.push(record),
                RoleKind::Participant => attendees.participants.push(record),
                RoleKind::Invitee => attendees.invitees.push(record),
                RoleKind::Rsvp => attendees.rsvps.push(record),
            }
        }
        let by_sequence = |a: &RoleRecord, b: &RoleRecord| {
            a.sequence_id
                .unwrap_or(i32::MAX)
                .cmp(&b.sequence_id.unwrap_or(i32::MAX))
                .then_with(|| a.created_at.cmp(&b.created_at))
        };
        attendees.participants.sort_by(by_sequence);
        attendees.rsvps.sort_by(by_sequence);
        attendees
    }
}

/// Rejects an operation on a broadcast of the wrong kind as not found.
pub(crate) fn ensure_kind(broadcast: &Broadcast, kind: BroadcastKind) -> Result<()> {
    if broadcast.kind == kind {
        Ok(())
    } else {
        Err(Error::NotFound(format!("{} {}", kind.label(), broadcast.id)))
    }
}

pub(crate) fn invalid_reorder(message: &str) -> Error {
    Error::Validation(ValidationError::InvalidInput(message.to_string()))
}
