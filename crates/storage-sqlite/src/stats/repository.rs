use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use eventcast_core::stats::{BroadcastStats, StatsRepositoryTrait};
use eventcast_core::Result;

use super::model::BroadcastStatsDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::broadcast_stats;

pub struct StatsRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl StatsRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        StatsRepository { pool, writer }
    }
}

#[async_trait]
impl StatsRepositoryTrait for StatsRepository {
    fn get(&self, broadcast_id: &str) -> Result<BroadcastStats> {
        let mut conn = get_connection(&self.pool)?;
        let row = broadcast_stats::table
            .find(broadcast_id)
            .select(BroadcastStatsDB::as_select())
            .first::<BroadcastStatsDB>(&mut conn)
            .into_core()?;
        row.try_into()
    }

    async fn upsert(&self, stats: BroadcastStats) -> Result<BroadcastStats> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BroadcastStats> {
                let row = BroadcastStatsDB::from(&stats);
                let saved = diesel::insert_into(broadcast_stats::table)
                    .values(&row)
                    .on_conflict(broadcast_stats::broadcast_id)
                    .do_update()
                    .set(&row)
                    .returning(BroadcastStatsDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                saved.try_into()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcasts::BroadcastRepository;
    use crate::test_support::{broadcast, setup};
    use eventcast_core::broadcasts::BroadcastRepositoryTrait;

    #[tokio::test]
    async fn test_upsert_overwrites_counts() {
        let db = setup().await;
        db.seed_users(&["u1"]).await;
        BroadcastRepository::new(Arc::clone(&db.pool), db.writer.clone())
            .create(broadcast("b1", "u1"), vec![])
            .await
            .unwrap();
        let repo = StatsRepository::new(Arc::clone(&db.pool), db.writer.clone());

        let mut stats = repo.get("b1").unwrap();
        stats.hosts = 1;
        stats.attendees = 3;
        stats.average_rating = Some(4.5);
        repo.upsert(stats.clone()).await.unwrap();
        stats.average_rating = None;
        let saved = repo.upsert(stats).await.unwrap();

        assert_eq!(saved.attendees, 3);
        assert_eq!(saved.average_rating, None);
        assert_eq!(repo.get("b1").unwrap().hosts, 1);
    }
}
