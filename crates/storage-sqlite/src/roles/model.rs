//! Database models for broadcast role records.

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use eventcast_core::errors::{DatabaseError, Error, Result};
use eventcast_core::roles::{EmailStatus, Holder, InviteeStatus, NewRoleRecord, RoleRecord};

use crate::utils::{from_db_time, parse_label, to_db_time};

/// One row per (broadcast, role, holder). Exactly one of `user_id` and
/// `external_email` is set.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::broadcast_roles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RoleRecordDB {
    pub id: String,
    pub broadcast_id: String,
    pub role: String,
    pub user_id: Option<String>,
    pub external_email: Option<String>,
    pub external_name: Option<String>,
    pub external_designation: Option<String>,
    pub origin: String,
    pub sequence_id: Option<i32>,
    pub is_mail_sent: bool,
    pub email_status: String,
    pub conference_url: Option<String>,
    pub invitee_status: Option<String>,
    pub created_at: String,
}

impl From<NewRoleRecord> for RoleRecordDB {
    fn from(record: NewRoleRecord) -> Self {
        let (user_id, external_email, external_name, external_designation) = match record.holder {
            Holder::Internal { user_id } => (Some(user_id), None, None, None),
            Holder::External {
                email,
                name,
                designation,
            } => (None, Some(email.trim().to_lowercase()), name, designation),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            broadcast_id: record.broadcast_id,
            role: record.role.as_str().to_string(),
            user_id,
            external_email,
            external_name,
            external_designation,
            origin: record.origin.as_str().to_string(),
            sequence_id: record.sequence_id,
            is_mail_sent: false,
            email_status: EmailStatus::NotSent.as_str().to_string(),
            conference_url: None,
            invitee_status: record.invitee_status.map(|s| s.as_str().to_string()),
            created_at: to_db_time(Utc::now()),
        }
    }
}

impl TryFrom<RoleRecordDB> for RoleRecord {
    type Error = Error;

    fn try_from(db: RoleRecordDB) -> Result<Self> {
        let holder = match (db.user_id, db.external_email) {
            (Some(user_id), None) => Holder::Internal { user_id },
            (None, Some(email)) => Holder::External {
                email,
                name: db.external_name,
                designation: db.external_designation,
            },
            _ => {
                return Err(Error::Database(DatabaseError::Internal(format!(
                    "Role record {} has no single holder",
                    db.id
                ))))
            }
        };
        Ok(Self {
            role: parse_label(&db.role)?,
            origin: parse_label(&db.origin)?,
            email_status: parse_label(&db.email_status)?,
            invitee_status: db
                .invitee_status
                .as_deref()
                .map(parse_label::<InviteeStatus>)
                .transpose()?,
            created_at: from_db_time(&db.created_at)?,
            id: db.id,
            broadcast_id: db.broadcast_id,
            holder,
            sequence_id: db.sequence_id,
            is_mail_sent: db.is_mail_sent,
            conference_url: db.conference_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventcast_core::roles::RoleKind;

    #[test]
    fn test_external_holder_is_stored_lowercased() {
        let record = NewRoleRecord::requested(
            "b1",
            RoleKind::Participant,
            Holder::external(" Guest@Example.com", Some("Guest".into())),
        );
        let row = RoleRecordDB::from(record);
        assert_eq!(row.user_id, None);
        assert_eq!(row.external_email.as_deref(), Some("guest@example.com"));
        assert_eq!(row.email_status, "NOT_SENT");

        let back = RoleRecord::try_from(row).unwrap();
        assert_eq!(back.holder.external_email(), Some("guest@example.com"));
    }

    #[test]
    fn test_invitee_status_round_trips() {
        let record = NewRoleRecord::requested("b1", RoleKind::Invitee, Holder::internal("u1"));
        let back = RoleRecord::try_from(RoleRecordDB::from(record)).unwrap();
        assert_eq!(back.invitee_status, Some(InviteeStatus::Invited));
        assert_eq!(back.holder.user_id(), Some("u1"));
    }

    #[test]
    fn test_row_without_holder_is_rejected() {
        let mut row = RoleRecordDB::from(NewRoleRecord::requested(
            "b1",
            RoleKind::Host,
            Holder::internal("u1"),
        ));
        row.user_id = None;
        assert!(RoleRecord::try_from(row).is_err());
    }
}
