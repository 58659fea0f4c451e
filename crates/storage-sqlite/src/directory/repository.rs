use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use eventcast_core::users::{Account, ContactStatus, DirectoryRepositoryTrait, NewUser, User};
use eventcast_core::Result;

use super::model::{AccountDB, ContactDB, DeviceTokenDB, UserDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{accounts, contacts, device_tokens, users};
use crate::utils::chunk_for_sqlite;

pub struct DirectoryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DirectoryRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        DirectoryRepository { pool, writer }
    }
}

#[async_trait]
impl DirectoryRepositoryTrait for DirectoryRepository {
    fn get_account(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        let account = accounts::table
            .find(account_id)
            .select(AccountDB::as_select())
            .first::<AccountDB>(&mut conn)
            .into_core()?;
        Ok(account.into())
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let user = users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .into_core()?;
        Ok(user.into())
    }

    fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;
        let mut found = Vec::with_capacity(user_ids.len());
        for chunk in chunk_for_sqlite(user_ids) {
            let rows = users::table
                .filter(users::id.eq_any(chunk))
                .select(UserDB::as_select())
                .load::<UserDB>(&mut conn)
                .into_core()?;
            found.extend(rows.into_iter().map(User::from));
        }
        Ok(found)
    }

    fn get_linked_contact_ids(
        &self,
        user_id: &str,
        candidate_ids: &[String],
        status: ContactStatus,
    ) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let mut linked = Vec::new();
        for chunk in chunk_for_sqlite(candidate_ids) {
            let rows = contacts::table
                .filter(contacts::status.eq(status.as_str()))
                .filter(
                    contacts::owner_id
                        .eq(user_id)
                        .and(contacts::contact_id.eq_any(chunk))
                        .or(contacts::contact_id
                            .eq(user_id)
                            .and(contacts::owner_id.eq_any(chunk))),
                )
                .select(ContactDB::as_select())
                .load::<ContactDB>(&mut conn)
                .into_core()?;
            for row in rows {
                let other = if row.owner_id == user_id {
                    row.contact_id
                } else {
                    row.owner_id
                };
                if !linked.contains(&other) {
                    linked.push(other);
                }
            }
        }
        Ok(linked)
    }

    fn get_device_tokens(&self, user_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        device_tokens::table
            .filter(device_tokens::user_id.eq(user_id))
            .select(device_tokens::token)
            .load::<String>(&mut conn)
            .into_core()
    }

    async fn create_account(&self, account: Account) -> Result<Account> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Account> {
                let row: AccountDB = account.into();
                diesel::insert_into(accounts::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let row: UserDB = new_user.into();
                let saved = diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(saved.into())
            })
            .await
    }

    async fn link_contact(
        &self,
        owner_id: &str,
        contact_id: &str,
        status: ContactStatus,
    ) -> Result<()> {
        let row = ContactDB {
            owner_id: owner_id.to_string(),
            contact_id: contact_id.to_string(),
            status: status.as_str().to_string(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(contacts::table)
                    .values(&row)
                    .on_conflict((contacts::owner_id, contacts::contact_id))
                    .do_update()
                    .set(contacts::status.eq(&row.status))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn add_device_token(&self, user_id: &str, token: &str) -> Result<()> {
        let row = DeviceTokenDB {
            user_id: user_id.to_string(),
            token: token.to_string(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_or_ignore_into(device_tokens::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_unknown_user_ids_are_omitted() {
        let db = setup().await;
        db.seed_users(&["u1", "u2"]).await;
        let repo = db.directory();

        let found = repo
            .get_users_by_ids(&["u2".into(), "ghost".into(), "u1".into()])
            .unwrap();

        let mut ids: Vec<_> = found.into_iter().map(|u| u.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert_eq!(repo.get_user("u1").unwrap().first_name, "U1");
    }

    #[tokio::test]
    async fn test_contacts_match_in_either_direction() {
        let db = setup().await;
        db.seed_users(&["u1", "u2", "u3", "u4"]).await;
        let repo = db.directory();
        repo.link_contact("u1", "u2", ContactStatus::Accepted)
            .await
            .unwrap();
        repo.link_contact("u3", "u1", ContactStatus::Accepted)
            .await
            .unwrap();
        repo.link_contact("u1", "u4", ContactStatus::Pending)
            .await
            .unwrap();
        let candidates: Vec<String> = vec!["u2".into(), "u3".into(), "u4".into()];

        let mut accepted = repo
            .get_linked_contact_ids("u1", &candidates, ContactStatus::Accepted)
            .unwrap();
        accepted.sort();
        assert_eq!(accepted, vec!["u2", "u3"]);

        let pending = repo
            .get_linked_contact_ids("u1", &candidates, ContactStatus::Pending)
            .unwrap();
        assert_eq!(pending, vec!["u4"]);
    }

    #[tokio::test]
    async fn test_relinking_updates_status() {
        let db = setup().await;
        db.seed_users(&["u1", "u2"]).await;
        let repo = db.directory();
        repo.link_contact("u1", "u2", ContactStatus::Pending)
            .await
            .unwrap();
        repo.link_contact("u1", "u2", ContactStatus::Accepted)
            .await
            .unwrap();

        let linked = repo
            .get_linked_contact_ids("u2", &["u1".into()], ContactStatus::Accepted)
            .unwrap();
        assert_eq!(linked, vec!["u1"]);
    }

    #[tokio::test]
    async fn test_device_tokens_are_deduplicated() {
        let db = setup().await;
        db.seed_users(&["u1"]).await;
        let repo = db.directory();
        repo.add_device_token("u1", "tok-1").await.unwrap();
        repo.add_device_token("u1", "tok-1").await.unwrap();
        repo.add_device_token("u1", "tok-2").await.unwrap();

        let mut tokens = repo.get_device_tokens("u1").unwrap();
        tokens.sort();
        assert_eq!(tokens, vec!["tok-1", "tok-2"]);
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let db = setup().await;
        assert!(matches!(
            db.directory().get_account("nope"),
            Err(eventcast_core::Error::Database(
                eventcast_core::errors::DatabaseError::NotFound(_)
            ))
        ));
    }
}
