//! Eventcast Core - domain entities, services, and traits.
//!
//! This crate contains the broadcast orchestration logic: audience
//! resolution, the broadcast lifecycle, conference provider sync, per-recipient
//! dispatch and stats aggregation. It is database-agnostic and defines traits
//! that are implemented by the `storage-sqlite` and `conference` crates.

pub mod audience;
pub mod broadcasts;
pub mod conference;
pub mod constants;
pub mod dispatch;
pub mod engagement;
pub mod errors;
pub mod events;
pub mod roles;
pub mod stats;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
