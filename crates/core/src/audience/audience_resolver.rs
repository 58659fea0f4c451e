use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use super::audience_model::{AudienceDiff, AudienceMember, AudienceRequest, ExternalGuest, ResolvedAudience};
use crate::errors::{FieldErrors, Result};
use crate::roles::{Holder, HolderKey, RoleKind, RoleRecord};
use crate::users::{ContactStatus, DirectoryRepositoryTrait, User};

/// Resolves audience requests against the user directory.
///
/// Resolution has no side effects: it either returns the complete member set
/// for every role or fails with field-keyed validation errors.
pub struct AudienceResolver {
    directory: Arc<dyn DirectoryRepositoryTrait>,
}

impl AudienceResolver {
    pub fn new(directory: Arc<dyn DirectoryRepositoryTrait>) -> Self {
        Self { directory }
    }

    pub fn resolve(&self, caller: &User, request: &AudienceRequest) -> Result<ResolvedAudience> {
        let account = self.directory.get_account(&caller.account_id)?;
        let visible_accounts = account.visible_account_ids();
        let mut errors = FieldErrors::default();

        validate_guests(request, &mut errors);

        let requested_ids = collect_internal_ids(request);
        let users: HashMap<String, User> = if requested_ids.is_empty() {
            HashMap::new()
        } else {
            self.directory
                .get_users_by_ids(&requested_ids)?
                .into_iter()
                .map(|user| (user.id.clone(), user))
                .collect()
        };
        let in_scope = |id: &str| {
            users
                .get(id)
                .is_some_and(|user| visible_accounts.contains(&user.account_id))
        };

        for role in [RoleKind::Host, RoleKind::Participant, RoleKind::Rsvp] {
            let missing: Vec<&str> = internal_ids(request.members(role))
                .filter(|id| !in_scope(*id))
                .collect();
            report_missing(&mut errors, role, &missing);
        }

        let invitee_ids: Vec<&str> = internal_ids(&request.invitees).collect();
        let outside: Vec<String> = invitee_ids
            .iter()
            .copied()
            .filter(|id| !in_scope(*id) && users.contains_key(*id))
            .map(str::to_string)
            .collect();
        let linked = self.linked_contacts(caller, &outside)?;
        let missing: Vec<&str> = invitee_ids
            .iter()
            .copied()
            .filter(|id| !in_scope(*id) && !linked.contains(*id))
            .collect();
        report_missing(&mut errors, RoleKind::Invitee, &missing);

        errors.into_result()?;

        let mut resolved = ResolvedAudience::default();
        for role in RoleKind::ALL {
            let members = request.members(role);
            let mut guests: Vec<&ExternalGuest> = external_guests(members).collect();
            if role == RoleKind::Participant {
                guests.extend(request.external_participants.iter());
            }
            *resolved.role_mut(role) = merge_role(internal_ids(members), guests, &users);
        }

        debug!(
            "Resolved audience for caller {}: {} members",
            caller.id,
            resolved.len()
        );
        Ok(resolved)
    }

    /// Invitee fallback channels: accepted contacts first, then pending requests.
    fn linked_contacts(&self, caller: &User, candidates: &[String]) -> Result<HashSet<String>> {
        let mut linked = HashSet::new();
        if candidates.is_empty() {
            return Ok(linked);
        }
        linked.extend(self.directory.get_linked_contact_ids(
            &caller.id,
            candidates,
            ContactStatus::Accepted,
        )?);
        let remaining: Vec<String> = candidates
            .iter()
            .filter(|id| !linked.contains(*id))
            .cloned()
            .collect();
        if !remaining.is_empty() {
            linked.extend(self.directory.get_linked_contact_ids(
                &caller.id,
                &remaining,
                ContactStatus::Pending,
            )?);
        }
        Ok(linked)
    }
}

/// Computes inserts and deletes between the persisted roles and a resolved audience.
///
/// System memberships count as present but are never scheduled for removal.
pub fn diff_audience(current: &[RoleRecord], resolved: &ResolvedAudience) -> AudienceDiff {
    let current_keys: HashSet<(RoleKind, HolderKey)> = current
        .iter()
        .map(|record| (record.role, record.holder.key()))
        .collect();
    let resolved_keys: HashSet<(RoleKind, HolderKey)> = resolved
        .iter()
        .map(|(role, holder)| (role, holder.key()))
        .collect();

    let added = resolved
        .iter()
        .filter(|(role, holder)| !current_keys.contains(&(*role, holder.key())))
        .map(|(role, holder)| (role, holder.clone()))
        .collect();
    let removed = current
        .iter()
        .filter(|record| {
            !record.is_system() && !resolved_keys.contains(&(record.role, record.holder.key()))
        })
        .cloned()
        .collect();

    AudienceDiff { added, removed }
}

fn validate_guests(request: &AudienceRequest, errors: &mut FieldErrors) {
    for role in RoleKind::ALL {
        for guest in external_guests(request.members(role)) {
            if !is_plausible_email(&guest.email) {
                errors.add(role.field_name(), format!("Invalid email '{}'", guest.email));
            }
        }
    }
    for guest in &request.external_participants {
        if !is_plausible_email(&guest.email) {
            errors.add(
                "externalParticipants",
                format!("Invalid email '{}'", guest.email),
            );
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(' '),
        None => false,
    }
}

fn report_missing(errors: &mut FieldErrors, role: RoleKind, missing: &[&str]) {
    if missing.is_empty() {
        return;
    }
    errors.add(
        role.field_name(),
        format!("User(s) {} does not exist", missing.join(", ")),
    );
}

fn internal_ids(members: &[AudienceMember]) -> impl Iterator<Item = &str> {
    members.iter().filter_map(|member| match member {
        AudienceMember::Internal { user_id } => Some(user_id.as_str()),
        AudienceMember::External(_) => None,
    })
}

fn external_guests(members: &[AudienceMember]) -> impl Iterator<Item = &ExternalGuest> {
    members.iter().filter_map(|member| match member {
        AudienceMember::Internal { .. } => None,
        AudienceMember::External(guest) => Some(guest),
    })
}

fn collect_internal_ids(request: &AudienceRequest) -> Vec<String> {
    let mut seen = HashSet::new();
    RoleKind::ALL
        .into_iter()
        .flat_map(|role| internal_ids(request.members(role)))
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Merges one role's internal ids and guests, dropping guests whose email
/// belongs to an internal member of the same role and collapsing duplicates.
fn merge_role<'a>(
    ids: impl Iterator<Item = &'a str>,
    guests: Vec<&ExternalGuest>,
    users: &HashMap<String, User>,
) -> Vec<Holder> {
    let mut holders = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut taken_emails = HashSet::new();

    for id in ids {
        let Some(user) = users.get(id) else {
            continue;
        };
        if seen_ids.insert(user.id.clone()) {
            taken_emails.insert(user.normalized_email());
            holders.push(Holder::internal(user.id.clone()));
        }
    }

    for guest in guests {
        if taken_emails.insert(guest.normalized_email()) {
            holders.push(guest.to_holder());
        } else {
            debug!("Dropping duplicate guest {}", guest.normalized_email());
        }
    }

    holders
}
