use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, error, info, warn};
use serde_json::json;

use super::dispatch_model::{
    DispatchReport, DispatchScope, DispatchSettings, DispatchVariant, NewNotification,
    PushMessage, RealtimeEvent, Recipient,
};
use super::dispatch_templates::{compose_creator_email, compose_email, notification_text};
use super::dispatch_traits::{
    DispatchServiceTrait, MailTransportTrait, NotificationRepositoryTrait, PushGatewayTrait,
    RealtimePublisherTrait, UnsubscribeRepositoryTrait,
};
use crate::broadcasts::{Broadcast, BroadcastRepositoryTrait};
use crate::constants::NOTIFICATION_CREATED_EVENT;
use crate::errors::{Error, Result};
use crate::roles::{Holder, RoleRecord, RoleRepositoryTrait};
use crate::users::{DirectoryRepositoryTrait, User};

/// Sends broadcast emails and notifications, tracking delivery per recipient.
///
/// Email passes run under the broadcast's dispatch lease. Each successful
/// gated send is committed before the next recipient is attempted, so a pass
/// interrupted midway resumes without resending.
pub struct DispatchService {
    broadcasts: Arc<dyn BroadcastRepositoryTrait>,
    roles: Arc<dyn RoleRepositoryTrait>,
    directory: Arc<dyn DirectoryRepositoryTrait>,
    unsubscribes: Arc<dyn UnsubscribeRepositoryTrait>,
    notifications: Arc<dyn NotificationRepositoryTrait>,
    mailer: Arc<dyn MailTransportTrait>,
    push: Arc<dyn PushGatewayTrait>,
    realtime: Arc<dyn RealtimePublisherTrait>,
    settings: DispatchSettings,
}

impl DispatchService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        broadcasts: Arc<dyn BroadcastRepositoryTrait>,
        roles: Arc<dyn RoleRepositoryTrait>,
        directory: Arc<dyn DirectoryRepositoryTrait>,
        unsubscribes: Arc<dyn UnsubscribeRepositoryTrait>,
        notifications: Arc<dyn NotificationRepositoryTrait>,
        mailer: Arc<dyn MailTransportTrait>,
        push: Arc<dyn PushGatewayTrait>,
        realtime: Arc<dyn RealtimePublisherTrait>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            broadcasts,
            roles,
            directory,
            unsubscribes,
            notifications,
            mailer,
            push,
            realtime,
            settings,
        }
    }

    fn select_records(
        &self,
        broadcast_id: &str,
        variant: DispatchVariant,
        scope: &DispatchScope,
    ) -> Result<Vec<RoleRecord>> {
        let mut records: Vec<RoleRecord> = self
            .roles
            .list_for_broadcast(broadcast_id)?
            .into_iter()
            .filter(|r| variant.selects(r) && scope.includes(&r.id))
            .collect();
        records.sort_by(|a, b| {
            a.role
                .cmp(&b.role)
                .then_with(|| {
                    a.sequence_id
                        .unwrap_or(i32::MAX)
                        .cmp(&b.sequence_id.unwrap_or(i32::MAX))
                })
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(records)
    }

    fn users_for(&self, records: &[RoleRecord]) -> Result<HashMap<String, User>> {
        let ids: Vec<String> = records
            .iter()
            .filter_map(|r| r.holder.user_id().map(str::to_string))
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .directory
            .get_users_by_ids(&ids)?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }

    fn recipient(record: &RoleRecord, users: &HashMap<String, User>) -> Option<Recipient> {
        let (user_id, email, name) = match &record.holder {
            Holder::Internal { user_id } => {
                let user = users.get(user_id)?;
                (
                    Some(user.id.clone()),
                    user.email.clone(),
                    Some(user.display_name()),
                )
            }
            Holder::External { email, name, .. } => (None, email.clone(), name.clone()),
        };
        Some(Recipient {
            role_id: record.id.clone(),
            role: record.role,
            user_id,
            email,
            name,
            conference_url: record.conference_url.clone(),
        })
    }

    async fn run_email_pass(
        &self,
        broadcast: &Broadcast,
        variant: DispatchVariant,
        scope: &DispatchScope,
    ) -> Result<DispatchReport> {
        let records = self.select_records(&broadcast.id, variant, scope)?;
        let users = self.users_for(&records)?;
        let organizer = self.directory.get_user(&broadcast.creator_id).ok();
        let mut report = DispatchReport::default();
        let mut seen_emails = HashSet::new();

        for record in &records {
            let Some(recipient) = Self::recipient(record, &users) else {
                warn!("No deliverable address for role record {}", record.id);
                report.failed.push(record.id.clone());
                continue;
            };
            if self
                .unsubscribes
                .is_unsubscribed(&recipient.email, broadcast.kind)?
            {
                debug!("{} unsubscribed from {}s", recipient.email, broadcast.kind);
                report.skipped.push(record.id.clone());
                continue;
            }
            // One-shot batches reach an address once even if it holds several roles.
            if !variant.is_gated() && !seen_emails.insert(recipient.email.to_lowercase()) {
                report.skipped.push(record.id.clone());
                continue;
            }

            let email = compose_email(
                broadcast,
                variant,
                &recipient,
                &self.settings,
                organizer.as_ref(),
            );
            match self.mailer.send(&email).await {
                Ok(()) => {
                    if variant.is_gated() {
                        self.roles.mark_email_sent(&record.id).await?;
                    }
                    report.sent.push(record.id.clone());
                }
                Err(e) => {
                    warn!(
                        "Failed to send {} email for broadcast {} to {}: {}",
                        variant, broadcast.id, recipient.email, e
                    );
                    report.failed.push(record.id.clone());
                }
            }
        }

        if variant == DispatchVariant::Launch && !broadcast.creator_notified {
            self.notify_creator(broadcast, organizer.as_ref()).await?;
        }

        Ok(report)
    }

    async fn notify_creator(&self, broadcast: &Broadcast, creator: Option<&User>) -> Result<()> {
        let Some(creator) = creator else {
            warn!("Creator of broadcast {} not found", broadcast.id);
            return Ok(());
        };
        let email = compose_creator_email(broadcast, creator, &self.settings);
        match self.mailer.send(&email).await {
            Ok(()) => self.broadcasts.mark_creator_notified(&broadcast.id).await,
            Err(e) => {
                warn!(
                    "Failed to confirm launch of broadcast {} to creator: {}",
                    broadcast.id, e
                );
                Ok(())
            }
        }
    }

    async fn deliver_notification(
        &self,
        broadcast: &Broadcast,
        variant: DispatchVariant,
        user: &User,
        record_id: &str,
    ) -> Result<String> {
        let (title, body) = notification_text(broadcast, variant);
        let (notification, unread) = self
            .notifications
            .create_and_increment(NewNotification {
                user_id: user.id.clone(),
                broadcast_id: broadcast.id.clone(),
                variant,
                title: title.clone(),
                body: body.clone(),
            })
            .await?;

        self.realtime.publish(RealtimeEvent {
            name: NOTIFICATION_CREATED_EVENT.to_string(),
            user_id: Some(user.id.clone()),
            payload: json!({
                "notification": notification,
                "unreadCount": unread,
            }),
        });

        let tokens = self.directory.get_device_tokens(&user.id)?;
        if !tokens.is_empty() {
            let message = PushMessage {
                tokens,
                title,
                body,
                data: json!({
                    "broadcastId": broadcast.id,
                    "kind": broadcast.kind,
                    "variant": variant,
                    "badge": unread,
                }),
            };
            if let Err(e) = self.push.push(&message).await {
                warn!("Push to user {} failed: {}", user.id, e);
            }
        }
        Ok(record_id.to_string())
    }
}

#[async_trait]
impl DispatchServiceTrait for DispatchService {
    async fn send_emails(
        &self,
        broadcast_id: &str,
        variant: DispatchVariant,
        scope: DispatchScope,
    ) -> Result<DispatchReport> {
        let broadcast = self.broadcasts.get_by_id(broadcast_id)?;
        if variant != DispatchVariant::Cancel && broadcast.is_cancelled {
            info!(
                "Skipping {} emails for cancelled broadcast {}",
                variant, broadcast_id
            );
            return Ok(DispatchReport::default());
        }

        let now = Utc::now();
        let leased = self
            .broadcasts
            .claim_dispatch_lease(broadcast_id, now, now + self.settings.lease_duration)
            .await?;
        if !leased {
            return Err(Error::DispatchInProgress(broadcast_id.to_string()));
        }

        let result = self.run_email_pass(&broadcast, variant, &scope).await;

        if let Err(e) = self.broadcasts.release_dispatch_lease(broadcast_id).await {
            error!(
                "Failed to release dispatch lease of broadcast {}: {}",
                broadcast_id, e
            );
        }

        if let Ok(report) = &result {
            info!(
                "{} emails for broadcast {}: {} sent, {} skipped, {} failed",
                variant,
                broadcast_id,
                report.sent.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }
        result
    }

    async fn notify(
        &self,
        broadcast_id: &str,
        variant: DispatchVariant,
        scope: DispatchScope,
    ) -> Result<DispatchReport> {
        let broadcast = self.broadcasts.get_by_id(broadcast_id)?;
        let records: Vec<RoleRecord> = self
            .roles
            .list_for_broadcast(broadcast_id)?
            .into_iter()
            .filter(|r| {
                variant.target_roles().contains(&r.role)
                    && scope.includes(&r.id)
                    && r.holder.user_id().is_some()
            })
            .collect();
        let users = self.users_for(&records)?;

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        let mut report = DispatchReport::default();
        for record in &records {
            let Some(user_id) = record.holder.user_id() else {
                continue;
            };
            match users.get(user_id) {
                Some(user) if seen.insert(user.id.clone()) => targets.push((user, record)),
                Some(_) => report.skipped.push(record.id.clone()),
                None => report.failed.push(record.id.clone()),
            }
        }

        let results = join_all(targets.iter().map(|(user, record)| {
            self.deliver_notification(&broadcast, variant, user, &record.id)
        }))
        .await;

        for ((user, record), result) in targets.iter().zip(results) {
            match result {
                Ok(id) => report.sent.push(id),
                Err(e) => {
                    warn!(
                        "Failed to notify user {} about broadcast {}: {}",
                        user.id, broadcast_id, e
                    );
                    report.failed.push(record.id.clone());
                }
            }
        }

        debug!(
            "{} notifications for broadcast {}: {} delivered",
            variant,
            broadcast_id,
            report.sent.len()
        );
        Ok(report)
    }
}
