use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;

use eventcast_core::broadcasts::{Broadcast, BroadcastKind, BroadcastRepositoryTrait};
use eventcast_core::errors::{DatabaseError, Error};
use eventcast_core::roles::NewRoleRecord;
use eventcast_core::stats::BroadcastStats;
use eventcast_core::Result;

use super::model::{BroadcastChangesDB, BroadcastDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::roles::RoleRecordDB;
use crate::schema::{broadcast_roles, broadcast_stats, broadcasts};
use crate::stats::BroadcastStatsDB;
use crate::utils::to_db_time;

pub struct BroadcastRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl BroadcastRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        BroadcastRepository { pool, writer }
    }
}

fn broadcast_not_found(broadcast_id: &str) -> Error {
    Error::Database(DatabaseError::NotFound(format!(
        "Broadcast {} not found",
        broadcast_id
    )))
}

#[async_trait]
impl BroadcastRepositoryTrait for BroadcastRepository {
    fn get_by_id(&self, broadcast_id: &str) -> Result<Broadcast> {
        let mut conn = get_connection(&self.pool)?;
        let row = broadcasts::table
            .find(broadcast_id)
            .select(BroadcastDB::as_select())
            .first::<BroadcastDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| broadcast_not_found(broadcast_id))?;
        row.try_into()
    }

    fn list(&self, account_id: &str, kind: BroadcastKind) -> Result<Vec<Broadcast>> {
        let mut conn = get_connection(&self.pool)?;
        broadcasts::table
            .filter(broadcasts::account_id.eq(account_id))
            .filter(broadcasts::kind.eq(kind.as_str()))
            .order(broadcasts::start_at.desc())
            .select(BroadcastDB::as_select())
            .load::<BroadcastDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Broadcast::try_from)
            .collect()
    }

    async fn create(&self, broadcast: Broadcast, roles: Vec<NewRoleRecord>) -> Result<Broadcast> {
        let row = BroadcastDB::try_from(&broadcast)?;
        let stats = BroadcastStatsDB::from(&BroadcastStats::empty(&broadcast.id));
        let role_rows: Vec<RoleRecordDB> = roles.into_iter().map(RoleRecordDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Broadcast> {
                let saved = diesel::insert_into(broadcasts::table)
                    .values(&row)
                    .returning(BroadcastDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                if !role_rows.is_empty() {
                    diesel::insert_into(broadcast_roles::table)
                        .values(&role_rows)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                diesel::insert_into(broadcast_stats::table)
                    .values(&stats)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!(
                    "Stored broadcast {} with {} role records",
                    saved.id,
                    role_rows.len()
                );
                saved.try_into()
            })
            .await
    }

    async fn update(&self, broadcast: Broadcast) -> Result<Broadcast> {
        let changes = BroadcastChangesDB::try_from(&broadcast)?;
        let id = broadcast.id;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Broadcast> {
                let saved = diesel::update(broadcasts::table.find(&id))
                    .set(&changes)
                    .returning(BroadcastDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| broadcast_not_found(&id))?;
                saved.try_into()
            })
            .await
    }

    async fn delete(&self, broadcast_id: &str) -> Result<usize> {
        let id = broadcast_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(broadcasts::table.find(id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn mark_cancelled(&self, broadcast_id: &str) -> Result<bool> {
        let id = broadcast_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let changed = diesel::update(
                    broadcasts::table
                        .filter(broadcasts::id.eq(&id))
                        .filter(broadcasts::is_draft.eq(false))
                        .filter(broadcasts::is_cancelled.eq(false)),
                )
                .set((
                    broadcasts::is_cancelled.eq(true),
                    broadcasts::updated_at.eq(to_db_time(Utc::now())),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(changed == 1)
            })
            .await
    }

    async fn claim_dispatch_lease(
        &self,
        broadcast_id: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let id = broadcast_id.to_string();
        let now = to_db_time(now);
        let expires_at = to_db_time(expires_at);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let exists = broadcasts::table
                    .find(&id)
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if exists == 0 {
                    return Err(broadcast_not_found(&id));
                }

                let claimed = diesel::update(
                    broadcasts::table.filter(broadcasts::id.eq(&id)).filter(
                        broadcasts::in_process
                            .eq(false)
                            .or(broadcasts::lease_expires_at.le(now.as_str())),
                    ),
                )
                .set((
                    broadcasts::in_process.eq(true),
                    broadcasts::lease_expires_at.eq(Some(expires_at.as_str())),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(claimed == 1)
            })
            .await
    }

    async fn release_dispatch_lease(&self, broadcast_id: &str) -> Result<()> {
        let id = broadcast_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(broadcasts::table.find(id))
                    .set((
                        broadcasts::in_process.eq(false),
                        broadcasts::lease_expires_at.eq(None::<String>),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn mark_creator_notified(&self, broadcast_id: &str) -> Result<()> {
        let id = broadcast_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(broadcasts::table.find(id))
                    .set(broadcasts::creator_notified.eq(true))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
