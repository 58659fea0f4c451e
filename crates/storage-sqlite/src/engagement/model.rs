//! Database models for attendance, ratings and Q&A.

use diesel::prelude::*;

use eventcast_core::engagement::{Answer, Attendance, Question};
use eventcast_core::errors::{Error, Result};

use crate::utils::{from_db_time, to_db_time};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::attendances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AttendanceDB {
    pub id: String,
    pub broadcast_id: String,
    pub user_id: String,
    pub joined_at: String,
    pub rating: Option<i32>,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::questions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuestionDB {
    pub id: String,
    pub broadcast_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::answers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnswerDB {
    pub id: String,
    pub question_id: String,
    pub broadcast_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

impl TryFrom<AttendanceDB> for Attendance {
    type Error = Error;

    fn try_from(db: AttendanceDB) -> Result<Self> {
        Ok(Self {
            joined_at: from_db_time(&db.joined_at)?,
            id: db.id,
            broadcast_id: db.broadcast_id,
            user_id: db.user_id,
            rating: db.rating,
        })
    }
}

impl From<Question> for QuestionDB {
    fn from(q: Question) -> Self {
        Self {
            created_at: to_db_time(q.created_at),
            id: q.id,
            broadcast_id: q.broadcast_id,
            author_id: q.author_id,
            body: q.body,
        }
    }
}

impl TryFrom<QuestionDB> for Question {
    type Error = Error;

    fn try_from(db: QuestionDB) -> Result<Self> {
        Ok(Self {
            created_at: from_db_time(&db.created_at)?,
            id: db.id,
            broadcast_id: db.broadcast_id,
            author_id: db.author_id,
            body: db.body,
        })
    }
}

impl From<Answer> for AnswerDB {
    fn from(a: Answer) -> Self {
        Self {
            created_at: to_db_time(a.created_at),
            id: a.id,
            question_id: a.question_id,
            broadcast_id: a.broadcast_id,
            author_id: a.author_id,
            body: a.body,
        }
    }
}

impl TryFrom<AnswerDB> for Answer {
    type Error = Error;

    fn try_from(db: AnswerDB) -> Result<Self> {
        Ok(Self {
            created_at: from_db_time(&db.created_at)?,
            id: db.id,
            question_id: db.question_id,
            broadcast_id: db.broadcast_id,
            author_id: db.author_id,
            body: db.body,
        })
    }
}
