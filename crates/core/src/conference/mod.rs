//! Conference provider sync - keeps broadcasts and registrants mirrored at
//! the external conferencing provider.

mod conference_model;
mod conference_service;
mod conference_traits;

#[cfg(test)]
mod conference_service_tests;

pub use conference_model::{
    ConferenceDetails, ConferenceLinks, ConferencePayload, PreRegistrationReport, Registrant,
};
pub use conference_service::ConferenceSyncService;
pub use conference_traits::{ConferenceProviderTrait, ConferenceSyncTrait};
