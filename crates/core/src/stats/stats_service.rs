use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::stats_model::{aggregate, BroadcastStats};
use super::stats_traits::{StatsRepositoryTrait, StatsServiceTrait};
use crate::broadcasts::BroadcastRepositoryTrait;
use crate::engagement::EngagementRepositoryTrait;
use crate::errors::Result;
use crate::roles::RoleRepositoryTrait;

pub struct StatsService {
    broadcasts: Arc<dyn BroadcastRepositoryTrait>,
    roles: Arc<dyn RoleRepositoryTrait>,
    engagement: Arc<dyn EngagementRepositoryTrait>,
    repository: Arc<dyn StatsRepositoryTrait>,
}

impl StatsService {
    pub fn new(
        broadcasts: Arc<dyn BroadcastRepositoryTrait>,
        roles: Arc<dyn RoleRepositoryTrait>,
        engagement: Arc<dyn EngagementRepositoryTrait>,
        repository: Arc<dyn StatsRepositoryTrait>,
    ) -> Self {
        Self {
            broadcasts,
            roles,
            engagement,
            repository,
        }
    }
}

#[async_trait]
impl StatsServiceTrait for StatsService {
    fn get_stats(&self, broadcast_id: &str) -> Result<BroadcastStats> {
        self.repository.get(broadcast_id)
    }

    async fn recompute(&self, broadcast_id: &str) -> Result<BroadcastStats> {
        let broadcast = self.broadcasts.get_by_id(broadcast_id)?;
        let roles = self.roles.list_for_broadcast(broadcast_id)?;
        let attendance = self.engagement.list_attendance(broadcast_id)?;
        let questions = self.engagement.count_questions(broadcast_id)?;
        let answers = self.engagement.count_answers(broadcast_id)?;

        let stats = aggregate(
            broadcast_id,
            &roles,
            &attendance,
            questions,
            answers,
            broadcast.files.len(),
        );
        debug!(
            "Recomputed stats for broadcast {}: {} hosts, {} participants, {} attendees",
            broadcast_id, stats.hosts, stats.participants, stats.attendees
        );
        self.repository.upsert(stats).await
    }
}
