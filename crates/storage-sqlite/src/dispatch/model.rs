use diesel::prelude::*;

use eventcast_core::dispatch::NotificationRecord;
use eventcast_core::errors::{Error, Result};

use crate::utils::{from_db_time, parse_label};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationDB {
    pub id: String,
    pub user_id: String,
    pub broadcast_id: String,
    pub variant: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

/// Opt-out of one broadcast kind. Emails are stored lowercased.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::unsubscribes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UnsubscribeDB {
    pub email: String,
    pub kind: String,
    pub created_at: String,
}

impl TryFrom<NotificationDB> for NotificationRecord {
    type Error = Error;

    fn try_from(db: NotificationDB) -> Result<Self> {
        Ok(Self {
            variant: parse_label(&db.variant)?,
            created_at: from_db_time(&db.created_at)?,
            id: db.id,
            user_id: db.user_id,
            broadcast_id: db.broadcast_id,
            title: db.title,
            body: db.body,
            is_read: db.is_read,
        })
    }
}
