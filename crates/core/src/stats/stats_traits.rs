use async_trait::async_trait;

use crate::errors::Result;
use crate::stats::stats_model::BroadcastStats;

#[async_trait]
pub trait StatsRepositoryTrait: Send + Sync {
    fn get(&self, broadcast_id: &str) -> Result<BroadcastStats>;
    async fn upsert(&self, stats: BroadcastStats) -> Result<BroadcastStats>;
}

#[async_trait]
pub trait StatsServiceTrait: Send + Sync {
    fn get_stats(&self, broadcast_id: &str) -> Result<BroadcastStats>;
    /// Recomputes every field from current state and stores the result.
    async fn recompute(&self, broadcast_id: &str) -> Result<BroadcastStats>;
}
