//! Role record domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleKind {
    Host,
    Participant,
    Invitee,
    Rsvp,
}

impl RoleKind {
    pub const ALL: [RoleKind; 4] = [
        RoleKind::Host,
        RoleKind::Participant,
        RoleKind::Invitee,
        RoleKind::Rsvp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Host => "HOST",
            RoleKind::Participant => "PARTICIPANT",
            RoleKind::Invitee => "INVITEE",
            RoleKind::Rsvp => "RSVP",
        }
    }

    /// Request field that carries members of this role.
    pub fn field_name(&self) -> &'static str {
        match self {
            RoleKind::Host => "hosts",
            RoleKind::Participant => "participants",
            RoleKind::Invitee => "invitees",
            RoleKind::Rsvp => "rsvps",
        }
    }

    /// Roles whose records carry an ordering sequence.
    pub fn is_sequenced(&self) -> bool {
        matches!(self, RoleKind::Participant | RoleKind::Rsvp)
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOST" => Ok(RoleKind::Host),
            "PARTICIPANT" => Ok(RoleKind::Participant),
            "INVITEE" => Ok(RoleKind::Invitee),
            "RSVP" => Ok(RoleKind::Rsvp),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown role '{}'",
                other
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailStatus {
    NotSent,
    Sent,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::NotSent => "NOT_SENT",
            EmailStatus::Sent => "SENT",
        }
    }
}

impl FromStr for EmailStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_SENT" => Ok(EmailStatus::NotSent),
            "SENT" => Ok(EmailStatus::Sent),
            other => Err(Error::Unexpected(format!("Unknown email status '{}'", other))),
        }
    }
}

/// Where a membership came from. System memberships are inserted outside the
/// audience request and are never removed by an audience update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleOrigin {
    Requested,
    System,
}

impl RoleOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleOrigin::Requested => "REQUESTED",
            RoleOrigin::System => "SYSTEM",
        }
    }
}

impl FromStr for RoleOrigin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUESTED" => Ok(RoleOrigin::Requested),
            "SYSTEM" => Ok(RoleOrigin::System),
            other => Err(Error::Unexpected(format!("Unknown role origin '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteeStatus {
    Invited,
    Registered,
}

impl InviteeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteeStatus::Invited => "INVITED",
            InviteeStatus::Registered => "REGISTERED",
        }
    }
}

impl FromStr for InviteeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INVITED" => Ok(InviteeStatus::Invited),
            "REGISTERED" => Ok(InviteeStatus::Registered),
            other => Err(Error::Unexpected(format!("Unknown invitee status '{}'", other))),
        }
    }
}

/// The audience member a role record points at: a system user or an external email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Holder {
    #[serde(rename_all = "camelCase")]
    Internal { user_id: String },
    #[serde(rename_all = "camelCase")]
    External {
        email: String,
        name: Option<String>,
        designation: Option<String>,
    },
}

/// Identity used for uniqueness within one role of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HolderKey {
    User(String),
    Email(String),
}

impl Holder {
    pub fn internal(user_id: impl Into<String>) -> Self {
        Holder::Internal {
            user_id: user_id.into(),
        }
    }

    pub fn external(email: impl Into<String>, name: Option<String>) -> Self {
        Holder::External {
            email: email.into(),
            name,
            designation: None,
        }
    }

    pub fn key(&self) -> HolderKey {
        match self {
            Holder::Internal { user_id } => HolderKey::User(user_id.clone()),
            Holder::External { email, .. } => HolderKey::Email(email.trim().to_lowercase()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Holder::Internal { user_id } => Some(user_id),
            Holder::External { .. } => None,
        }
    }

    pub fn external_email(&self) -> Option<&str> {
        match self {
            Holder::Internal { .. } => None,
            Holder::External { email, .. } => Some(email),
        }
    }
}

/// One audience member in one role of one broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: String,
    pub broadcast_id: String,
    pub role: RoleKind,
    pub holder: Holder,
    pub origin: RoleOrigin,
    pub sequence_id: Option<i32>,
    pub is_mail_sent: bool,
    pub email_status: EmailStatus,
    pub conference_url: Option<String>,
    pub invitee_status: Option<InviteeStatus>,
    pub created_at: DateTime<Utc>,
}

impl RoleRecord {
    pub fn is_system(&self) -> bool {
        self.origin == RoleOrigin::System
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoleRecord {
    pub broadcast_id: String,
    pub role: RoleKind,
    pub holder: Holder,
    pub origin: RoleOrigin,
    pub sequence_id: Option<i32>,
    pub invitee_status: Option<InviteeStatus>,
}

impl NewRoleRecord {
    pub fn requested(broadcast_id: &str, role: RoleKind, holder: Holder) -> Self {
        Self {
            broadcast_id: broadcast_id.to_string(),
            role,
            holder,
            origin: RoleOrigin::Requested,
            sequence_id: None,
            invitee_status: (role == RoleKind::Invitee).then_some(InviteeStatus::Invited),
        }
    }
}
