use async_trait::async_trait;

use crate::broadcasts::Broadcast;
use crate::conference::conference_model::{
    ConferenceDetails, ConferenceLinks, ConferencePayload, PreRegistrationReport, Registrant,
};
use crate::errors::Result;
use crate::roles::RoleRecord;

/// The external conferencing provider.
///
/// Implementations report failures as [`crate::errors::Error::Provider`]
/// carrying the provider's error payload.
#[async_trait]
pub trait ConferenceProviderTrait: Send + Sync {
    async fn create_conference(&self, payload: &ConferencePayload) -> Result<ConferenceDetails>;
    async fn update_conference(
        &self,
        conference_id: &str,
        payload: &ConferencePayload,
    ) -> Result<ConferenceDetails>;
    async fn fetch_admin_url(&self, conference_id: &str) -> Result<String>;
    async fn delete_conference(&self, conference_id: &str) -> Result<()>;
    /// Registers an attendee and returns their personal join URL.
    async fn register_attendee(&self, conference_id: &str, registrant: &Registrant)
        -> Result<String>;
    async fn deregister_attendee(&self, conference_id: &str, email: &str) -> Result<()>;
}

/// Broadcast-level conference synchronisation.
#[async_trait]
pub trait ConferenceSyncTrait: Send + Sync {
    /// Creates the conference if the broadcast has none, otherwise updates it,
    /// then resolves the admin URL.
    async fn create_or_update(&self, broadcast: &Broadcast) -> Result<ConferenceLinks>;
    /// Registers every host, participant and RSVP still lacking a conference URL.
    async fn pre_register(&self, broadcast: &Broadcast) -> Result<PreRegistrationReport>;
    async fn delete(&self, conference_id: &str) -> Result<()>;
    async fn register(&self, broadcast: &Broadcast, record: &RoleRecord) -> Result<String>;
    async fn deregister(&self, broadcast: &Broadcast, record: &RoleRecord) -> Result<()>;
}
