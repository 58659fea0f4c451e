use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use eventcast_core::broadcasts::BroadcastKind;
use eventcast_core::dispatch::{
    NewNotification, NotificationRecord, NotificationRepositoryTrait, UnsubscribeRepositoryTrait,
};
use eventcast_core::errors::{DatabaseError, Error};
use eventcast_core::Result;

use super::model::{NotificationDB, UnsubscribeDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{notifications, unsubscribes, users};
use crate::utils::to_db_time;

pub struct NotificationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl NotificationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        NotificationRepository { pool, writer }
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationRecord>> {
        let mut conn = get_connection(&self.pool)?;
        notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order(notifications::created_at.desc())
            .select(NotificationDB::as_select())
            .load::<NotificationDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(NotificationRecord::try_from)
            .collect()
    }

    async fn create_and_increment(
        &self,
        notification: NewNotification,
    ) -> Result<(NotificationRecord, i64)> {
        let row = NotificationDB {
            id: Uuid::new_v4().to_string(),
            user_id: notification.user_id,
            broadcast_id: notification.broadcast_id,
            variant: notification.variant.as_str().to_string(),
            title: notification.title,
            body: notification.body,
            is_read: false,
            created_at: to_db_time(Utc::now()),
        };

        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<(NotificationRecord, i64)> {
                    let unread = diesel::update(users::table.find(&row.user_id))
                        .set(users::unread_notifications.eq(users::unread_notifications + 1))
                        .returning(users::unread_notifications)
                        .get_result::<i64>(conn)
                        .optional()
                        .map_err(StorageError::from)?
                        .ok_or_else(|| {
                            Error::Database(DatabaseError::NotFound(format!(
                                "User {} not found",
                                row.user_id
                            )))
                        })?;
                    let saved = diesel::insert_into(notifications::table)
                        .values(&row)
                        .returning(NotificationDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;
                    Ok((saved.try_into()?, unread))
                },
            )
            .await
    }
}

pub struct UnsubscribeRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl UnsubscribeRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        UnsubscribeRepository { pool, writer }
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UnsubscribeRepositoryTrait for UnsubscribeRepository {
    fn is_unsubscribed(&self, email: &str, kind: BroadcastKind) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let count = unsubscribes::table
            .filter(unsubscribes::email.eq(normalize(email)))
            .filter(unsubscribes::kind.eq(kind.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()?;
        Ok(count > 0)
    }

    async fn unsubscribe(&self, email: &str, kind: BroadcastKind) -> Result<()> {
        let row = UnsubscribeDB {
            email: normalize(email),
            kind: kind.as_str().to_string(),
            created_at: to_db_time(Utc::now()),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_or_ignore_into(unsubscribes::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn resubscribe(&self, email: &str, kind: BroadcastKind) -> Result<()> {
        let email = normalize(email);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(
                    unsubscribes::table
                        .filter(unsubscribes::email.eq(&email))
                        .filter(unsubscribes::kind.eq(kind.as_str())),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
