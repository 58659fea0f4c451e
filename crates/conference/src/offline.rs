//! Provider used when no conferencing API is configured.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use log::info;
use uuid::Uuid;

use eventcast_core::conference::{
    ConferenceDetails, ConferencePayload, ConferenceProviderTrait, Registrant,
};
use eventcast_core::errors::{Error, ProviderFailure, Result};

/// Issues join links under `base_url` without calling out.
///
/// Conferences live in memory only; unknown ids are reported the way the
/// real provider reports them.
pub struct OfflineConferenceProvider {
    base_url: String,
    conferences: Mutex<HashSet<String>>,
}

impl OfflineConferenceProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            conferences: Mutex::new(HashSet::new()),
        }
    }

    fn known(&self, conference_id: &str) -> Result<()> {
        let conferences = self
            .conferences
            .lock()
            .map_err(|_| Error::Unexpected("Conference registry poisoned".to_string()))?;
        if conferences.contains(conference_id) {
            Ok(())
        } else {
            Err(Error::Provider(ProviderFailure::message(format!(
                "Conference {} does not exist",
                conference_id
            ))))
        }
    }

    fn details(&self, conference_id: &str) -> ConferenceDetails {
        ConferenceDetails {
            conference_id: conference_id.to_string(),
            conference_address: format!("{}/j/{}", self.base_url, conference_id),
            presenter_url: Some(format!("{}/s/{}", self.base_url, conference_id)),
        }
    }
}

#[async_trait]
impl ConferenceProviderTrait for OfflineConferenceProvider {
    async fn create_conference(&self, payload: &ConferencePayload) -> Result<ConferenceDetails> {
        let conference_id = Uuid::new_v4().simple().to_string();
        self.conferences
            .lock()
            .map_err(|_| Error::Unexpected("Conference registry poisoned".to_string()))?
            .insert(conference_id.clone());
        info!("Offline conference {} created for '{}'", conference_id, payload.topic);
        Ok(self.details(&conference_id))
    }

    async fn update_conference(
        &self,
        conference_id: &str,
        _payload: &ConferencePayload,
    ) -> Result<ConferenceDetails> {
        self.known(conference_id)?;
        Ok(self.details(conference_id))
    }

    async fn fetch_admin_url(&self, conference_id: &str) -> Result<String> {
        self.known(conference_id)?;
        Ok(format!("{}/admin/{}", self.base_url, conference_id))
    }

    async fn delete_conference(&self, conference_id: &str) -> Result<()> {
        self.conferences
            .lock()
            .map_err(|_| Error::Unexpected("Conference registry poisoned".to_string()))?
            .remove(conference_id);
        Ok(())
    }

    async fn register_attendee(
        &self,
        conference_id: &str,
        registrant: &Registrant,
    ) -> Result<String> {
        self.known(conference_id)?;
        Ok(format!(
            "{}/j/{}?tk={}",
            self.base_url,
            conference_id,
            urlencoding::encode(&registrant.email)
        ))
    }

    async fn deregister_attendee(&self, conference_id: &str, _email: &str) -> Result<()> {
        self.known(conference_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn payload() -> ConferencePayload {
        let start = Utc.with_ymd_and_hms(2026, 11, 3, 16, 0, 0).unwrap();
        ConferencePayload {
            topic: "Quarterly review".to_string(),
            agenda: None,
            start_time: start,
            end_time: start + chrono::Duration::minutes(45),
            duration: 45,
            timezone: "UTC".to_string(),
        }
    }

    #[tokio::test]
    async fn test_registration_links_are_personal() {
        let provider = OfflineConferenceProvider::new("https://meet.local/");
        let details = provider.create_conference(&payload()).await.unwrap();
        assert!(details
            .conference_address
            .starts_with("https://meet.local/j/"));

        let registrant = Registrant {
            email: "ada+ops@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "L".to_string(),
        };
        let url = provider
            .register_attendee(&details.conference_id, &registrant)
            .await
            .unwrap();
        assert!(url.ends_with("tk=ada%2Bops%40example.com"));
    }

    #[tokio::test]
    async fn test_unknown_conference_is_provider_failure() {
        let provider = OfflineConferenceProvider::new("https://meet.local");
        let err = provider.fetch_admin_url("missing").await.unwrap_err();
        match err {
            Error::Provider(failure) => {
                assert!(!failure.status);
                assert_eq!(
                    failure.response["error"],
                    "Conference missing does not exist"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deleted_conference_forgets_registrations() {
        let provider = OfflineConferenceProvider::new("https://meet.local");
        let details = provider.create_conference(&payload()).await.unwrap();
        provider
            .delete_conference(&details.conference_id)
            .await
            .unwrap();
        assert!(provider
            .deregister_attendee(&details.conference_id, "a@example.com")
            .await
            .is_err());
    }
}
