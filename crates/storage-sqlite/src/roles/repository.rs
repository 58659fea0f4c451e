use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use eventcast_core::errors::{DatabaseError, Error};
use eventcast_core::roles::{
    EmailStatus, InviteeStatus, NewRoleRecord, RoleKind, RoleRecord, RoleRepositoryTrait,
};
use eventcast_core::Result;

use super::model::RoleRecordDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::broadcast_roles;
use crate::utils::chunk_for_sqlite;

pub struct RoleRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RoleRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        RoleRepository { pool, writer }
    }

    async fn update_one<F>(&self, role_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut SqliteConnection, &str) -> QueryResult<usize> + Send + 'static,
    {
        let id = role_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let changed = apply(conn, &id).map_err(StorageError::from)?;
                if changed == 0 {
                    return Err(role_not_found(&id));
                }
                Ok(())
            })
            .await
    }
}

fn role_not_found(role_id: &str) -> Error {
    Error::Database(DatabaseError::NotFound(format!(
        "Role record {} not found",
        role_id
    )))
}

#[async_trait]
impl RoleRepositoryTrait for RoleRepository {
    fn get(&self, role_id: &str) -> Result<RoleRecord> {
        let mut conn = get_connection(&self.pool)?;
        let row = broadcast_roles::table
            .find(role_id)
            .select(RoleRecordDB::as_select())
            .first::<RoleRecordDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| role_not_found(role_id))?;
        row.try_into()
    }

    fn list_for_broadcast(&self, broadcast_id: &str) -> Result<Vec<RoleRecord>> {
        let mut conn = get_connection(&self.pool)?;
        broadcast_roles::table
            .filter(broadcast_roles::broadcast_id.eq(broadcast_id))
            .order((broadcast_roles::created_at.asc(), broadcast_roles::id.asc()))
            .select(RoleRecordDB::as_select())
            .load::<RoleRecordDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(RoleRecord::try_from)
            .collect()
    }

    async fn apply_changes(
        &self,
        insert: Vec<NewRoleRecord>,
        delete_ids: Vec<String>,
    ) -> Result<Vec<RoleRecord>> {
        let rows: Vec<RoleRecordDB> = insert.into_iter().map(RoleRecordDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<RoleRecord>> {
                // Deletes run first so a replaced holder can be reinserted
                // under the same unique key.
                for chunk in chunk_for_sqlite(&delete_ids) {
                    diesel::delete(broadcast_roles::table.filter(broadcast_roles::id.eq_any(chunk)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                let mut added = Vec::with_capacity(rows.len());
                for row in &rows {
                    let saved = diesel::insert_into(broadcast_roles::table)
                        .values(row)
                        .returning(RoleRecordDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;
                    added.push(RoleRecord::try_from(saved)?);
                }
                Ok(added)
            })
            .await
    }

    async fn mark_email_sent(&self, role_id: &str) -> Result<()> {
        self.update_one(role_id, |conn, id| {
            diesel::update(broadcast_roles::table.find(id))
                .set((
                    broadcast_roles::is_mail_sent.eq(true),
                    broadcast_roles::email_status.eq(EmailStatus::Sent.as_str()),
                ))
                .execute(conn)
        })
        .await
    }

    async fn reset_email_status(&self, role_ids: Vec<String>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut touched = 0;
                for chunk in chunk_for_sqlite(&role_ids) {
                    touched += diesel::update(
                        broadcast_roles::table.filter(broadcast_roles::id.eq_any(chunk)),
                    )
                    .set((
                        broadcast_roles::is_mail_sent.eq(false),
                        broadcast_roles::email_status.eq(EmailStatus::NotSent.as_str()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(touched)
            })
            .await
    }

    async fn set_conference_url(&self, role_id: &str, url: Option<String>) -> Result<()> {
        self.update_one(role_id, move |conn, id| {
            diesel::update(broadcast_roles::table.find(id))
                .set(broadcast_roles::conference_url.eq(url))
                .execute(conn)
        })
        .await
    }

    async fn set_invitee_status(&self, role_id: &str, status: InviteeStatus) -> Result<()> {
        self.update_one(role_id, move |conn, id| {
            diesel::update(broadcast_roles::table.find(id))
                .set(broadcast_roles::invitee_status.eq(Some(status.as_str())))
                .execute(conn)
        })
        .await
    }

    async fn reorder(
        &self,
        broadcast_id: &str,
        role: RoleKind,
        ordered_ids: Vec<String>,
    ) -> Result<()> {
        let broadcast_id = broadcast_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(
                    broadcast_roles::table
                        .filter(broadcast_roles::broadcast_id.eq(&broadcast_id))
                        .filter(broadcast_roles::role.eq(role.as_str())),
                )
                .set(broadcast_roles::sequence_id.eq(None::<i32>))
                .execute(conn)
                .map_err(StorageError::from)?;

                for (index, id) in ordered_ids.iter().enumerate() {
                    diesel::update(
                        broadcast_roles::table
                            .filter(broadcast_roles::id.eq(id))
                            .filter(broadcast_roles::broadcast_id.eq(&broadcast_id))
                            .filter(broadcast_roles::role.eq(role.as_str())),
                    )
                    .set(broadcast_roles::sequence_id.eq(Some(index as i32 + 1)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcasts::BroadcastRepository;
    use crate::test_support::{broadcast, setup, TestDb};
    use eventcast_core::broadcasts::BroadcastRepositoryTrait;
    use eventcast_core::roles::Holder;

    fn repo(db: &TestDb) -> RoleRepository {
        RoleRepository::new(Arc::clone(&db.pool), db.writer.clone())
    }

    async fn seeded() -> TestDb {
        let db = setup().await;
        db.seed_users(&["u1", "u2", "u3"]).await;
        BroadcastRepository::new(Arc::clone(&db.pool), db.writer.clone())
            .create(broadcast("b1", "u1"), vec![])
            .await
            .unwrap();
        db
    }

    fn participant(holder: Holder, sequence: i32) -> NewRoleRecord {
        let mut record = NewRoleRecord::requested("b1", RoleKind::Participant, holder);
        record.sequence_id = Some(sequence);
        record
    }

    #[tokio::test]
    async fn test_same_holder_twice_in_a_role_is_unique_violation() {
        let db = seeded().await;
        let upper = NewRoleRecord::requested(
            "b1",
            RoleKind::Rsvp,
            Holder::external("Guest@Example.com", None),
        );
        let lower = NewRoleRecord::requested(
            "b1",
            RoleKind::Rsvp,
            Holder::external("guest@example.com", None),
        );
        repo(&db).apply_changes(vec![upper], vec![]).await.unwrap();

        let err = repo(&db).apply_changes(vec![lower], vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::UniqueViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_changes_deletes_before_inserting() {
        let db = seeded().await;
        let added = repo(&db)
            .apply_changes(vec![participant(Holder::internal("u2"), 1)], vec![])
            .await
            .unwrap();

        let replaced = repo(&db)
            .apply_changes(
                vec![participant(Holder::internal("u2"), 1)],
                vec![added[0].id.clone()],
            )
            .await
            .unwrap();

        let all = repo(&db).list_for_broadcast("b1").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, replaced[0].id);
    }

    #[tokio::test]
    async fn test_reorder_renumbers_from_one() {
        let db = seeded().await;
        let added = repo(&db)
            .apply_changes(
                vec![
                    participant(Holder::internal("u2"), 1),
                    participant(Holder::internal("u3"), 2),
                ],
                vec![],
            )
            .await
            .unwrap();
        let (first, second) = (added[0].id.clone(), added[1].id.clone());

        repo(&db)
            .reorder("b1", RoleKind::Participant, vec![second.clone(), first.clone()])
            .await
            .unwrap();

        assert_eq!(repo(&db).get(&second).unwrap().sequence_id, Some(1));
        assert_eq!(repo(&db).get(&first).unwrap().sequence_id, Some(2));
    }

    #[tokio::test]
    async fn test_email_status_flags() {
        let db = seeded().await;
        let added = repo(&db)
            .apply_changes(
                vec![NewRoleRecord::requested(
                    "b1",
                    RoleKind::Invitee,
                    Holder::internal("u2"),
                )],
                vec![],
            )
            .await
            .unwrap();
        let id = added[0].id.clone();

        repo(&db).mark_email_sent(&id).await.unwrap();
        let sent = repo(&db).get(&id).unwrap();
        assert!(sent.is_mail_sent);
        assert_eq!(sent.email_status, EmailStatus::Sent);

        assert_eq!(repo(&db).reset_email_status(vec![id.clone()]).await.unwrap(), 1);
        assert_eq!(repo(&db).get(&id).unwrap().email_status, EmailStatus::NotSent);

        repo(&db)
            .set_invitee_status(&id, InviteeStatus::Registered)
            .await
            .unwrap();
        repo(&db)
            .set_conference_url(&id, Some("https://conf.test/j/1".into()))
            .await
            .unwrap();
        let registered = repo(&db).get(&id).unwrap();
        assert_eq!(registered.invitee_status, Some(InviteeStatus::Registered));
        assert_eq!(
            registered.conference_url.as_deref(),
            Some("https://conf.test/j/1")
        );
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_not_found() {
        let db = seeded().await;
        let err = repo(&db).mark_email_sent("ghost").await.unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
    }
}
