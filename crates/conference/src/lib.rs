//! Eventcast Conference - client for the external conferencing provider.
//!
//! This crate implements `eventcast_core::conference::ConferenceProviderTrait`
//! against the provider's JSON API. Every call carries the account API key.
//! [`OfflineConferenceProvider`] stands in when no provider is configured.
//!
//! # Usage
//!
//! ```rust,ignore
//! use eventcast_conference::{ConferenceClient, ConferenceConfig};
//!
//! let client = ConferenceClient::new(ConferenceConfig::new(
//!     "https://api.conference.example",
//!     "api-key",
//! ))?;
//! let details = client.create_conference(&payload).await?;
//! ```

mod client;
mod error;
mod offline;
mod types;

pub use client::{ConferenceClient, ConferenceConfig};
pub use error::{ConferenceError, Result};
pub use offline::OfflineConferenceProvider;
pub use types::*;
