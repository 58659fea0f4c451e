use serde::{Deserialize, Serialize};

use crate::roles::{Holder, RoleKind, RoleRecord};
use crate::users::User;

/// A free-form guest identified only by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalGuest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub designation: Option<String>,
}

impl ExternalGuest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: None,
            last_name: None,
            designation: None,
        }
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    pub(crate) fn to_holder(&self) -> Holder {
        Holder::External {
            email: self.normalized_email(),
            name: self.display_name(),
            designation: self.designation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AudienceMember {
    #[serde(rename_all = "camelCase")]
    Internal { user_id: String },
    External(ExternalGuest),
}

impl AudienceMember {
    pub fn user(user_id: impl Into<String>) -> Self {
        AudienceMember::Internal {
            user_id: user_id.into(),
        }
    }

    pub fn guest(email: impl Into<String>) -> Self {
        AudienceMember::External(ExternalGuest::new(email))
    }
}

/// Requested audience of a broadcast, one list per role.
///
/// Participants arrive through two channels: `participants` (usually system
/// users) and `external_participants` (guests only). Both feed the same role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceRequest {
    #[serde(default)]
    pub hosts: Vec<AudienceMember>,
    #[serde(default)]
    pub participants: Vec<AudienceMember>,
    #[serde(default)]
    pub external_participants: Vec<ExternalGuest>,
    #[serde(default)]
    pub invitees: Vec<AudienceMember>,
    #[serde(default)]
    pub rsvps: Vec<AudienceMember>,
}

impl AudienceRequest {
    pub(crate) fn members(&self, role: RoleKind) -> &[AudienceMember] {
        match role {
            RoleKind::Host => &self.hosts,
            RoleKind::Participant => &self.participants,
            RoleKind::Invitee => &self.invitees,
            RoleKind::Rsvp => &self.rsvps,
        }
    }
}

/// Final, deduplicated members per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAudience {
    pub hosts: Vec<Holder>,
    pub participants: Vec<Holder>,
    pub invitees: Vec<Holder>,
    pub rsvps: Vec<Holder>,
}

impl ResolvedAudience {
    pub fn role(&self, role: RoleKind) -> &[Holder] {
        match role {
            RoleKind::Host => &self.hosts,
            RoleKind::Participant => &self.participants,
            RoleKind::Invitee => &self.invitees,
            RoleKind::Rsvp => &self.rsvps,
        }
    }

    pub(crate) fn role_mut(&mut self, role: RoleKind) -> &mut Vec<Holder> {
        match role {
            RoleKind::Host => &mut self.hosts,
            RoleKind::Participant => &mut self.participants,
            RoleKind::Invitee => &mut self.invitees,
            RoleKind::Rsvp => &mut self.rsvps,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RoleKind, &Holder)> {
        RoleKind::ALL
            .into_iter()
            .flat_map(move |role| self.role(role).iter().map(move |h| (role, h)))
    }

    pub fn len(&self) -> usize {
        self.hosts.len() + self.participants.len() + self.invitees.len() + self.rsvps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the creator from the host list. The creator is tracked on the
    /// broadcast itself, not as a host record.
    pub fn without_creator(mut self, creator: &User) -> Self {
        let creator_email = creator.normalized_email();
        self.hosts.retain(|holder| match holder {
            Holder::Internal { user_id } => user_id != &creator.id,
            Holder::External { email, .. } => email.trim().to_lowercase() != creator_email,
        });
        self
    }
}

/// Role membership changes needed to move from the persisted set to a resolved one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudienceDiff {
    pub added: Vec<(RoleKind, Holder)>,
    pub removed: Vec<RoleRecord>,
}

impl AudienceDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
