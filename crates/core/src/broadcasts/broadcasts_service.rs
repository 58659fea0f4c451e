use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};
use uuid::Uuid;

use super::broadcasts_model::{
    ensure_kind, invalid_reorder, Broadcast, BroadcastAttendees, BroadcastKind, BroadcastUpdate,
    NewBroadcast,
};
use super::broadcasts_traits::{BroadcastRepositoryTrait, BroadcastServiceTrait};
use crate::audience::{diff_audience, AudienceDiff, AudienceResolver};
use crate::conference::ConferenceSyncTrait;
use crate::dispatch::DispatchVariant;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::roles::{
    Holder, InviteeStatus, NewRoleRecord, RoleKind, RoleRecord, RoleRepositoryTrait,
};
use crate::users::{DirectoryRepositoryTrait, User};

/// Service driving broadcasts through `draft -> launched -> cancelled`.
pub struct BroadcastService {
    broadcasts: Arc<dyn BroadcastRepositoryTrait>,
    roles: Arc<dyn RoleRepositoryTrait>,
    directory: Arc<dyn DirectoryRepositoryTrait>,
    conference: Arc<dyn ConferenceSyncTrait>,
    resolver: AudienceResolver,
    event_sink: Arc<dyn DomainEventSink>,
}

impl BroadcastService {
    pub fn new(
        broadcasts: Arc<dyn BroadcastRepositoryTrait>,
        roles: Arc<dyn RoleRepositoryTrait>,
        directory: Arc<dyn DirectoryRepositoryTrait>,
        conference: Arc<dyn ConferenceSyncTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            resolver: AudienceResolver::new(directory.clone()),
            broadcasts,
            roles,
            directory,
            conference,
            event_sink,
        }
    }

    fn load(&self, kind: BroadcastKind, broadcast_id: &str) -> Result<Broadcast> {
        let broadcast = self.broadcasts.get_by_id(broadcast_id)?;
        ensure_kind(&broadcast, kind)?;
        Ok(broadcast)
    }

    fn require_launched(broadcast: &Broadcast, action: &str) -> Result<()> {
        if broadcast.is_launched() {
            return Ok(());
        }
        Err(Error::InvalidTransition(format!(
            "Cannot {} {} {} while it is {:?}",
            action,
            broadcast.kind.label().to_lowercase(),
            broadcast.id,
            broadcast.state()
        )))
    }

    /// Runs provider sync and flips the broadcast out of draft. Nothing is
    /// persisted unless the provider call succeeds.
    async fn launch(&self, broadcast: Broadcast) -> Result<Broadcast> {
        let links = self.conference.create_or_update(&broadcast).await?;
        let created_conference = broadcast.conference_id.is_none();

        let mut launched = broadcast;
        launched.apply_conference(links);
        launched.is_draft = false;
        launched.updated_at = Utc::now();

        match self.broadcasts.update(launched.clone()).await {
            Ok(saved) => {
                info!(
                    "{} {} launched with conference {:?}",
                    saved.kind.label(),
                    saved.id,
                    saved.conference_id
                );
                self.event_sink
                    .emit(DomainEvent::broadcast_launched(saved.id.clone(), saved.kind));
                Ok(saved)
            }
            Err(e) => {
                if created_conference {
                    if let Some(conference_id) = launched.conference_id.as_deref() {
                        if let Err(delete_err) = self.conference.delete(conference_id).await {
                            warn!(
                                "Orphaned conference {} after failed launch of {}: {}",
                                conference_id, launched.id, delete_err
                            );
                        }
                    }
                }
                Err(e)
            }
        }
    }

    fn find_invitee(
        &self,
        broadcast_id: &str,
        actor: &User,
        status: InviteeStatus,
    ) -> Result<Option<RoleRecord>> {
        let email = actor.normalized_email();
        Ok(self
            .roles
            .list_for_broadcast(broadcast_id)?
            .into_iter()
            .find(|r| {
                r.role == RoleKind::Invitee
                    && r.invitee_status == Some(status)
                    && match &r.holder {
                        Holder::Internal { user_id } => user_id == &actor.id,
                        Holder::External { email: e, .. } => e.trim().to_lowercase() == email,
                    }
            }))
    }

    async fn deregister_removed(&self, broadcast: &Broadcast, diff: &AudienceDiff) {
        for record in diff.removed.iter().filter(|r| r.conference_url.is_some()) {
            if let Err(e) = self.conference.deregister(broadcast, record).await {
                warn!(
                    "Failed to deregister removed member {} of {}: {}",
                    record.id, broadcast.id, e
                );
            }
        }
    }
}

/// Builds role records for `members`, continuing each sequenced role's
/// numbering after the highest sequence among `existing`.
fn new_role_records(
    broadcast_id: &str,
    members: impl Iterator<Item = (RoleKind, Holder)>,
    existing: &[RoleRecord],
) -> Vec<NewRoleRecord> {
    let mut next_sequence: HashMap<RoleKind, i32> = HashMap::new();
    for record in existing {
        if let Some(sequence) = record.sequence_id {
            let next = next_sequence.entry(record.role).or_insert(1);
            *next = (*next).max(sequence + 1);
        }
    }

    members
        .map(|(role, holder)| {
            let mut record = NewRoleRecord::requested(broadcast_id, role, holder);
            if role.is_sequenced() {
                let next = next_sequence.entry(role).or_insert(1);
                record.sequence_id = Some(*next);
                *next += 1;
            }
            record
        })
        .collect()
}

#[async_trait]
impl BroadcastServiceTrait for BroadcastService {
    fn get_broadcast(&self, kind: BroadcastKind, broadcast_id: &str) -> Result<Broadcast> {
        self.load(kind, broadcast_id)
    }

    fn list_broadcasts(&self, actor_id: &str, kind: BroadcastKind) -> Result<Vec<Broadcast>> {
        let actor = self.directory.get_user(actor_id)?;
        self.broadcasts.list(&actor.account_id, kind)
    }

    fn get_attendees(
        &self,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<BroadcastAttendees> {
        let broadcast = self.load(kind, broadcast_id)?;
        let records = self.roles.list_for_broadcast(&broadcast.id)?;
        Ok(BroadcastAttendees::from_records(records))
    }

    async fn create_broadcast(
        &self,
        actor_id: &str,
        new_broadcast: NewBroadcast,
    ) -> Result<Broadcast> {
        new_broadcast.validate()?;
        let creator = self.directory.get_user(actor_id)?;
        let resolved = self
            .resolver
            .resolve(&creator, &new_broadcast.audience)?
            .without_creator(&creator);

        let now = Utc::now();
        let broadcast = Broadcast {
            id: Uuid::new_v4().to_string(),
            kind: new_broadcast.kind,
            account_id: creator.account_id.clone(),
            creator_id: creator.id.clone(),
            title: new_broadcast.title.trim().to_string(),
            description: new_broadcast.description,
            start_at: new_broadcast.start_at,
            end_at: new_broadcast.end_at,
            visibility: new_broadcast.visibility.unwrap_or_default(),
            is_draft: true,
            is_cancelled: false,
            in_process: false,
            lease_expires_at: None,
            creator_notified: false,
            conference_id: None,
            join_url: None,
            admin_url: None,
            presenter_url: None,
            cc_emails: new_broadcast.cc_emails,
            files: new_broadcast.files,
            created_at: now,
            updated_at: now,
        };

        let records = new_role_records(
            &broadcast.id,
            resolved.iter().map(|(role, holder)| (role, holder.clone())),
            &[],
        );

        debug!(
            "Creating {} '{}' with {} role records",
            broadcast.kind,
            broadcast.title,
            records.len()
        );
        let created = self.broadcasts.create(broadcast, records).await?;

        if !new_broadcast.launch {
            self.event_sink
                .emit(DomainEvent::broadcast_created(created.id.clone(), created.kind));
            return Ok(created);
        }

        let broadcast_id = created.id.clone();
        match self.launch(created).await {
            Ok(launched) => Ok(launched),
            Err(e) => {
                warn!("Launch of new broadcast {} failed: {}", broadcast_id, e);
                if let Err(delete_err) = self.broadcasts.delete(&broadcast_id).await {
                    error!(
                        "Failed to roll back broadcast {} after launch failure: {}",
                        broadcast_id, delete_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn update_broadcast(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        update: BroadcastUpdate,
    ) -> Result<Broadcast> {
        let current = self.load(kind, broadcast_id)?;
        if current.is_cancelled {
            return Err(Error::InvalidTransition(format!(
                "Cancelled {} {} cannot be updated",
                kind, broadcast_id
            )));
        }
        let actor = self.directory.get_user(actor_id)?;

        let mut next = current.clone();
        update.apply_to(&mut next)?;

        let existing = self.roles.list_for_broadcast(&current.id)?;
        let diff = match &update.audience {
            Some(request) => {
                let creator = self.directory.get_user(&current.creator_id)?;
                let resolved = self
                    .resolver
                    .resolve(&actor, request)?
                    .without_creator(&creator);
                diff_audience(&existing, &resolved)
            }
            None => AudienceDiff::default(),
        };

        let schedule_changed =
            next.start_at != current.start_at || next.end_at != current.end_at;
        let conference_changed = schedule_changed
            || next.title != current.title
            || next.description != current.description;

        if current.is_launched() && conference_changed && current.conference_id.is_some() {
            let links = self.conference.create_or_update(&next).await?;
            next.apply_conference(links);
        }

        next.updated_at = Utc::now();
        let saved = self.broadcasts.update(next).await?;

        let added = if diff.is_empty() {
            Vec::new()
        } else {
            let inserts = new_role_records(&saved.id, diff.added.iter().cloned(), &existing);
            let removed_ids = diff.removed.iter().map(|r| r.id.clone()).collect();
            self.roles.apply_changes(inserts, removed_ids).await?
        };

        if current.is_draft {
            if update.launch {
                return self.launch(saved).await;
            }
            self.event_sink
                .emit(DomainEvent::membership_changed(saved.id.clone()));
            return Ok(saved);
        }

        self.deregister_removed(&saved, &diff).await;

        let added_ids: Vec<String> = added.into_iter().map(|r| r.id).collect();
        let notify_existing = schedule_changed || !diff.is_empty();
        info!(
            "{} {} updated: {} added, {} removed, schedule changed: {}",
            kind.label(),
            saved.id,
            added_ids.len(),
            diff.removed.len(),
            schedule_changed
        );
        self.event_sink.emit(DomainEvent::broadcast_updated(
            saved.id.clone(),
            saved.kind,
            added_ids,
            notify_existing,
        ));
        Ok(saved)
    }

    async fn cancel_broadcast(
        &self,
        _actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<Broadcast> {
        let broadcast = self.load(kind, broadcast_id)?;
        Self::require_launched(&broadcast, "cancel")?;

        if let Some(conference_id) = broadcast.conference_id.as_deref() {
            self.conference.delete(conference_id).await?;
        }
        if !self.broadcasts.mark_cancelled(&broadcast.id).await? {
            return Err(Error::InvalidTransition(format!(
                "{} {} is already cancelled",
                kind.label(),
                broadcast_id
            )));
        }

        info!("{} {} cancelled", kind.label(), broadcast_id);
        self.event_sink
            .emit(DomainEvent::broadcast_cancelled(broadcast.id.clone(), kind));
        self.broadcasts.get_by_id(broadcast_id)
    }

    async fn delete_broadcast(
        &self,
        _actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<()> {
        let broadcast = self.load(kind, broadcast_id)?;
        if !broadcast.is_draft || broadcast.is_cancelled {
            return Err(Error::InvalidTransition(format!(
                "Only draft {}s can be deleted",
                kind
            )));
        }
        if let Some(conference_id) = broadcast.conference_id.as_deref() {
            self.conference.delete(conference_id).await?;
        }
        self.broadcasts.delete(broadcast_id).await?;
        info!("{} {} deleted", kind.label(), broadcast_id);
        self.event_sink
            .emit(DomainEvent::broadcast_deleted(broadcast_id.to_string(), kind));
        Ok(())
    }

    async fn resend_invitations(
        &self,
        _actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        role_ids: Option<Vec<String>>,
    ) -> Result<usize> {
        let broadcast = self.load(kind, broadcast_id)?;
        Self::require_launched(&broadcast, "resend invitations for")?;

        let candidates: Vec<RoleRecord> = self
            .roles
            .list_for_broadcast(broadcast_id)?
            .into_iter()
            .filter(|r| DispatchVariant::Launch.target_roles().contains(&r.role))
            .collect();

        let selected: Vec<String> = match &role_ids {
            Some(ids) => {
                let known: HashSet<&str> = candidates.iter().map(|r| r.id.as_str()).collect();
                let unknown: Vec<&str> = ids
                    .iter()
                    .map(String::as_str)
                    .filter(|id| !known.contains(id))
                    .collect();
                if !unknown.is_empty() {
                    return Err(Error::field(
                        "roleIds",
                        format!("Unknown role record(s) {}", unknown.join(", ")),
                    ));
                }
                ids.clone()
            }
            None => candidates.into_iter().map(|r| r.id).collect(),
        };
        if selected.is_empty() {
            return Ok(0);
        }

        let reset = self.roles.reset_email_status(selected.clone()).await?;
        self.event_sink
            .emit(DomainEvent::invitations_reset(broadcast_id.to_string(), selected));
        Ok(reset)
    }

    async fn register_invitee(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<RoleRecord> {
        let broadcast = self.load(kind, broadcast_id)?;
        Self::require_launched(&broadcast, "register for")?;
        let actor = self.directory.get_user(actor_id)?;

        let record = self
            .find_invitee(&broadcast.id, &actor, InviteeStatus::Invited)?
            .ok_or_else(|| {
                Error::Forbidden(format!(
                    "User {} has no pending invitation to {}",
                    actor.id, broadcast_id
                ))
            })?;

        self.roles
            .set_invitee_status(&record.id, InviteeStatus::Registered)
            .await?;
        match self.conference.register(&broadcast, &record).await {
            Ok(url) => {
                self.roles
                    .set_conference_url(&record.id, Some(url))
                    .await?;
            }
            Err(e) => {
                if let Err(revert_err) = self
                    .roles
                    .set_invitee_status(&record.id, InviteeStatus::Invited)
                    .await
                {
                    error!(
                        "Failed to revert registration of {}: {}",
                        record.id, revert_err
                    );
                }
                return Err(e);
            }
        }

        self.event_sink
            .emit(DomainEvent::membership_changed(broadcast.id.clone()));
        self.roles.get(&record.id)
    }

    async fn deregister_invitee(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<RoleRecord> {
        let broadcast = self.load(kind, broadcast_id)?;
        Self::require_launched(&broadcast, "deregister from")?;
        let actor = self.directory.get_user(actor_id)?;

        let record = self
            .find_invitee(&broadcast.id, &actor, InviteeStatus::Registered)?
            .ok_or_else(|| {
                Error::Forbidden(format!(
                    "User {} is not registered for {}",
                    actor.id, broadcast_id
                ))
            })?;

        self.roles
            .set_invitee_status(&record.id, InviteeStatus::Invited)
            .await?;
        if let Err(e) = self.conference.deregister(&broadcast, &record).await {
            if let Err(revert_err) = self
                .roles
                .set_invitee_status(&record.id, InviteeStatus::Registered)
                .await
            {
                error!(
                    "Failed to revert deregistration of {}: {}",
                    record.id, revert_err
                );
            }
            return Err(e);
        }
        self.roles.set_conference_url(&record.id, None).await?;

        self.event_sink
            .emit(DomainEvent::membership_changed(broadcast.id.clone()));
        self.roles.get(&record.id)
    }

    async fn reorder(
        &self,
        _actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        role: RoleKind,
        ordered_ids: Vec<String>,
    ) -> Result<BroadcastAttendees> {
        if !role.is_sequenced() {
            return Err(Error::field(
                "role",
                "Only participants and RSVPs can be reordered",
            ));
        }
        let broadcast = self.load(kind, broadcast_id)?;
        if broadcast.is_cancelled {
            return Err(Error::InvalidTransition(format!(
                "Cancelled {} {} cannot be reordered",
                kind, broadcast_id
            )));
        }

        let mut current: Vec<String> = self
            .roles
            .list_for_broadcast(broadcast_id)?
            .into_iter()
            .filter(|r| r.role == role)
            .map(|r| r.id)
            .collect();
        let mut requested = ordered_ids.clone();
        current.sort();
        requested.sort();
        if current != requested {
            return Err(invalid_reorder(&format!(
                "Order must list every {} record exactly once",
                role.as_str().to_lowercase()
            )));
        }

        self.roles.reorder(broadcast_id, role, ordered_ids).await?;
        self.get_attendees(kind, broadcast_id)
    }
}
