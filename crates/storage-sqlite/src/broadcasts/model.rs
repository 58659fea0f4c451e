//! Database models for broadcasts.

use diesel::prelude::*;

use eventcast_core::broadcasts::{Broadcast, FileRef};
use eventcast_core::errors::{Error, Result};

use crate::errors::IntoCore;
use crate::utils::{from_db_time, from_db_time_opt, parse_label, to_db_time};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::broadcasts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BroadcastDB {
    pub id: String,
    pub kind: String,
    pub account_id: String,
    pub creator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_at: String,
    pub end_at: String,
    pub visibility: String,
    pub is_draft: bool,
    pub is_cancelled: bool,
    pub in_process: bool,
    pub lease_expires_at: Option<String>,
    pub creator_notified: bool,
    pub conference_id: Option<String>,
    pub join_url: Option<String>,
    pub admin_url: Option<String>,
    pub presenter_url: Option<String>,
    pub cc_emails: String,
    pub files: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable columns of a broadcast. The dispatch lease and creator flag are
/// written only by their dedicated statements.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::broadcasts)]
#[diesel(treat_none_as_null = true)]
pub struct BroadcastChangesDB {
    pub title: String,
    pub description: Option<String>,
    pub start_at: String,
    pub end_at: String,
    pub visibility: String,
    pub is_draft: bool,
    pub is_cancelled: bool,
    pub conference_id: Option<String>,
    pub join_url: Option<String>,
    pub admin_url: Option<String>,
    pub presenter_url: Option<String>,
    pub cc_emails: String,
    pub files: String,
    pub updated_at: String,
}

impl TryFrom<&Broadcast> for BroadcastDB {
    type Error = Error;

    fn try_from(broadcast: &Broadcast) -> Result<Self> {
        Ok(Self {
            id: broadcast.id.clone(),
            kind: broadcast.kind.as_str().to_string(),
            account_id: broadcast.account_id.clone(),
            creator_id: broadcast.creator_id.clone(),
            title: broadcast.title.clone(),
            description: broadcast.description.clone(),
            start_at: to_db_time(broadcast.start_at),
            end_at: to_db_time(broadcast.end_at),
            visibility: broadcast.visibility.as_str().to_string(),
            is_draft: broadcast.is_draft,
            is_cancelled: broadcast.is_cancelled,
            in_process: broadcast.in_process,
            lease_expires_at: broadcast.lease_expires_at.map(to_db_time),
            creator_notified: broadcast.creator_notified,
            conference_id: broadcast.conference_id.clone(),
            join_url: broadcast.join_url.clone(),
            admin_url: broadcast.admin_url.clone(),
            presenter_url: broadcast.presenter_url.clone(),
            cc_emails: serde_json::to_string(&broadcast.cc_emails).into_core()?,
            files: serde_json::to_string(&broadcast.files).into_core()?,
            created_at: to_db_time(broadcast.created_at),
            updated_at: to_db_time(broadcast.updated_at),
        })
    }
}

impl TryFrom<&Broadcast> for BroadcastChangesDB {
    type Error = Error;

    fn try_from(broadcast: &Broadcast) -> Result<Self> {
        Ok(Self {
            title: broadcast.title.clone(),
            description: broadcast.description.clone(),
            start_at: to_db_time(broadcast.start_at),
            end_at: to_db_time(broadcast.end_at),
            visibility: broadcast.visibility.as_str().to_string(),
            is_draft: broadcast.is_draft,
            is_cancelled: broadcast.is_cancelled,
            conference_id: broadcast.conference_id.clone(),
            join_url: broadcast.join_url.clone(),
            admin_url: broadcast.admin_url.clone(),
            presenter_url: broadcast.presenter_url.clone(),
            cc_emails: serde_json::to_string(&broadcast.cc_emails).into_core()?,
            files: serde_json::to_string(&broadcast.files).into_core()?,
            updated_at: to_db_time(broadcast.updated_at),
        })
    }
}

impl TryFrom<BroadcastDB> for Broadcast {
    type Error = Error;

    fn try_from(db: BroadcastDB) -> Result<Self> {
        let cc_emails: Vec<String> = serde_json::from_str(&db.cc_emails).into_core()?;
        let files: Vec<FileRef> = serde_json::from_str(&db.files).into_core()?;
        Ok(Self {
            kind: parse_label(&db.kind)?,
            visibility: parse_label(&db.visibility)?,
            start_at: from_db_time(&db.start_at)?,
            end_at: from_db_time(&db.end_at)?,
            lease_expires_at: from_db_time_opt(db.lease_expires_at.as_deref())?,
            created_at: from_db_time(&db.created_at)?,
            updated_at: from_db_time(&db.updated_at)?,
            id: db.id,
            account_id: db.account_id,
            creator_id: db.creator_id,
            title: db.title,
            description: db.description,
            is_draft: db.is_draft,
            is_cancelled: db.is_cancelled,
            in_process: db.in_process,
            creator_notified: db.creator_notified,
            conference_id: db.conference_id,
            join_url: db.join_url,
            admin_url: db.admin_url,
            presenter_url: db.presenter_url,
            cc_emails,
            files,
        })
    }
}
