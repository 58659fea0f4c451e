//! Database models for the user directory.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use eventcast_core::users::{Account, NewUser, User};

#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub name: String,
    pub primary_account_id: Option<String>,
}

#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub account_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub unread_notifications: i64,
}

#[derive(Queryable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::contacts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContactDB {
    pub owner_id: String,
    pub contact_id: String,
    pub status: String,
}

#[derive(Queryable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::device_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DeviceTokenDB {
    pub user_id: String,
    pub token: String,
}

impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            primary_account_id: db.primary_account_id,
        }
    }
}

impl From<Account> for AccountDB {
    fn from(domain: Account) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            primary_account_id: domain.primary_account_id,
        }
    }
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            account_id: db.account_id,
            email: db.email,
            first_name: db.first_name,
            last_name: db.last_name,
            unread_notifications: db.unread_notifications,
        }
    }
}

impl From<NewUser> for UserDB {
    fn from(domain: NewUser) -> Self {
        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            account_id: domain.account_id,
            email: domain.email.trim().to_string(),
            first_name: domain.first_name,
            last_name: domain.last_name,
            unread_notifications: 0,
        }
    }
}
