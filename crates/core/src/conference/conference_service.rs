use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::conference_model::{ConferenceLinks, ConferencePayload, PreRegistrationReport, Registrant};
use super::conference_traits::{ConferenceProviderTrait, ConferenceSyncTrait};
use crate::broadcasts::Broadcast;
use crate::errors::{Error, Result};
use crate::roles::{Holder, RoleKind, RoleRecord, RoleRepositoryTrait};
use crate::users::{DirectoryRepositoryTrait, User};

/// Service mirroring broadcasts and their registrants at the conferencing provider.
pub struct ConferenceSyncService {
    provider: Arc<dyn ConferenceProviderTrait>,
    roles: Arc<dyn RoleRepositoryTrait>,
    directory: Arc<dyn DirectoryRepositoryTrait>,
}

impl ConferenceSyncService {
    pub fn new(
        provider: Arc<dyn ConferenceProviderTrait>,
        roles: Arc<dyn RoleRepositoryTrait>,
        directory: Arc<dyn DirectoryRepositoryTrait>,
    ) -> Self {
        Self {
            provider,
            roles,
            directory,
        }
    }

    fn conference_id(broadcast: &Broadcast) -> Result<&str> {
        broadcast.conference_id.as_deref().ok_or_else(|| {
            Error::InvalidTransition(format!(
                "{} {} has no conference",
                broadcast.kind.label(),
                broadcast.id
            ))
        })
    }

    fn registrant(record: &RoleRecord, users: &HashMap<String, User>) -> Option<Registrant> {
        match &record.holder {
            Holder::Internal { user_id } => users.get(user_id).map(|user| Registrant {
                email: user.email.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
            }),
            Holder::External { email, name, .. } => {
                let (first_name, last_name) = split_name(name.as_deref(), email);
                Some(Registrant {
                    email: email.clone(),
                    first_name,
                    last_name,
                })
            }
        }
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
}

/// Splits a display name into provider first/last name fields, defaulting to
/// the email's local part.
fn split_name(name: Option<&str>, email: &str) -> (String, String) {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    match name {
        Some(name) => match name.split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (name.to_string(), String::new()),
        },
        None => (
            email.split('@').next().unwrap_or(email).to_string(),
            String::new(),
        ),
    }
}

#[async_trait]
impl ConferenceSyncTrait for ConferenceSyncService {
    async fn create_or_update(&self, broadcast: &Broadcast) -> Result<ConferenceLinks> {
        let payload = ConferencePayload::from(broadcast);
        let details = match broadcast.conference_id.as_deref() {
            None => {
                debug!("Creating conference for broadcast {}", broadcast.id);
                self.provider.create_conference(&payload).await?
            }
            Some(conference_id) => {
                debug!(
                    "Updating conference {} for broadcast {}",
                    conference_id, broadcast.id
                );
                self.provider
                    .update_conference(conference_id, &payload)
                    .await?
            }
        };

        let admin_url = self.provider.fetch_admin_url(&details.conference_id).await?;

        info!(
            "Conference {} synced for broadcast {}",
            details.conference_id, broadcast.id
        );
        Ok(ConferenceLinks {
            conference_id: details.conference_id,
            join_url: details.conference_address,
            presenter_url: details.presenter_url,
            admin_url: Some(admin_url),
        })
    }

    async fn pre_register(&self, broadcast: &Broadcast) -> Result<PreRegistrationReport> {
        let conference_id = Self::conference_id(broadcast)?;
        let pending: Vec<RoleRecord> = self
            .roles
            .list_for_broadcast(&broadcast.id)?
            .into_iter()
            .filter(|r| {
                matches!(r.role, RoleKind::Host | RoleKind::Participant | RoleKind::Rsvp)
                    && r.conference_url.is_none()
            })
            .collect();
        let users = self.users_for(&pending)?;

        let mut report = PreRegistrationReport::default();
        for record in &pending {
            let Some(registrant) = Self::registrant(record, &users) else {
                warn!("Skipping registration of {}: user not found", record.id);
                report
                    .failed
                    .push((record.id.clone(), "user not found".to_string()));
                continue;
            };

            match self
                .provider
                .register_attendee(conference_id, &registrant)
                .await
            {
                Ok(url) => match self.roles.set_conference_url(&record.id, Some(url)).await {
                    Ok(()) => report.registered.push(record.id.clone()),
                    Err(e) => {
                        warn!("Failed to store conference url for {}: {}", record.id, e);
                        report.failed.push((record.id.clone(), e.to_string()));
                    }
                },
                Err(e) => {
                    warn!(
                        "Provider registration failed for {} ({}): {}",
                        record.id, registrant.email, e
                    );
                    report.failed.push((record.id.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Pre-registration for broadcast {}: {} registered, {} failed",
            broadcast.id,
            report.registered.len(),
            report.failed.len()
        );
        Ok(report)
    }

    async fn delete(&self, conference_id: &str) -> Result<()> {
        debug!("Deleting conference {}", conference_id);
        self.provider.delete_conference(conference_id).await
    }

    async fn register(&self, broadcast: &Broadcast, record: &RoleRecord) -> Result<String> {
        let conference_id = Self::conference_id(broadcast)?;
        let users = self.users_for(std::slice::from_ref(record))?;
        let registrant = Self::registrant(record, &users)
            .ok_or_else(|| Error::NotFound(format!("User for role record {}", record.id)))?;
        self.provider
            .register_attendee(conference_id, &registrant)
            .await
    }

    async fn deregister(&self, broadcast: &Broadcast, record: &RoleRecord) -> Result<()> {
        let conference_id = Self::conference_id(broadcast)?;
        let users = self.users_for(std::slice::from_ref(record))?;
        let registrant = Self::registrant(record, &users)
            .ok_or_else(|| Error::NotFound(format!("User for role record {}", record.id)))?;
        self.provider
            .deregister_attendee(conference_id, &registrant.email)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::split_name;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name(Some("Grace Brewster Hopper"), "g@x.io"),
            ("Grace".to_string(), "Brewster Hopper".to_string())
        );
        assert_eq!(
            split_name(Some("Grace"), "g@x.io"),
            ("Grace".to_string(), String::new())
        );
        assert_eq!(
            split_name(None, "guest@x.io"),
            ("guest".to_string(), String::new())
        );
    }
}
