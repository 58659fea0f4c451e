//! Stats aggregator - derived per-broadcast rollups, always fully recomputed.

mod stats_model;
mod stats_service;
mod stats_traits;

#[cfg(test)]
mod stats_service_tests;

pub use stats_model::{aggregate, BroadcastStats};
pub use stats_service::StatsService;
pub use stats_traits::{StatsRepositoryTrait, StatsServiceTrait};
