//! SQLite storage implementation for Eventcast.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `eventcast-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for the broadcast domain
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` is database-agnostic and works with traits.
//!
//! ```text
//!       core (domain)
//!             │
//!             ▼
//!   storage-sqlite (this crate)
//!             │
//!             ▼
//!         SQLite DB
//! ```
//!
//! All writes go through a single writer task (see [`db::WriteHandle`]);
//! reads use the pool directly.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod broadcasts;
pub mod directory;
pub mod dispatch;
pub mod engagement;
pub mod roles;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use broadcasts::BroadcastRepository;
pub use directory::DirectoryRepository;
pub use dispatch::{NotificationRepository, UnsubscribeRepository};
pub use engagement::EngagementRepository;
pub use roles::RoleRepository;
pub use stats::StatsRepository;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from eventcast-core for convenience
pub use eventcast_core::errors::{DatabaseError, Error, Result};
