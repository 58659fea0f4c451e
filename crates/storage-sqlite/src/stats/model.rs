use diesel::prelude::*;

use eventcast_core::errors::{Error, Result};
use eventcast_core::stats::BroadcastStats;

use crate::utils::{from_db_time, to_db_time};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::broadcast_stats)]
#[diesel(primary_key(broadcast_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BroadcastStatsDB {
    pub broadcast_id: String,
    pub hosts: i64,
    pub participants: i64,
    pub invitees: i64,
    pub rsvps: i64,
    pub attendees: i64,
    pub questions: i64,
    pub answers: i64,
    pub files: i64,
    pub average_rating: Option<f64>,
    pub updated_at: String,
}

impl From<&BroadcastStats> for BroadcastStatsDB {
    fn from(stats: &BroadcastStats) -> Self {
        Self {
            broadcast_id: stats.broadcast_id.clone(),
            hosts: stats.hosts,
            participants: stats.participants,
            invitees: stats.invitees,
            rsvps: stats.rsvps,
            attendees: stats.attendees,
            questions: stats.questions,
            answers: stats.answers,
            files: stats.files,
            average_rating: stats.average_rating,
            updated_at: to_db_time(stats.updated_at),
        }
    }
}

impl TryFrom<BroadcastStatsDB> for BroadcastStats {
    type Error = Error;

    fn try_from(db: BroadcastStatsDB) -> Result<Self> {
        Ok(Self {
            updated_at: from_db_time(&db.updated_at)?,
            broadcast_id: db.broadcast_id,
            hosts: db.hosts,
            participants: db.participants,
            invitees: db.invitees,
            rsvps: db.rsvps,
            attendees: db.attendees,
            questions: db.questions,
            answers: db.answers,
            files: db.files,
            average_rating: db.average_rating,
        })
    }
}
