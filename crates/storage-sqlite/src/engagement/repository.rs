use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use eventcast_core::engagement::{Answer, Attendance, EngagementRepositoryTrait, Question};
use eventcast_core::errors::{DatabaseError, Error};
use eventcast_core::Result;

use super::model::{AnswerDB, AttendanceDB, QuestionDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{answers, attendances, questions};
use crate::utils::to_db_time;

pub struct EngagementRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl EngagementRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        EngagementRepository { pool, writer }
    }
}

#[async_trait]
impl EngagementRepositoryTrait for EngagementRepository {
    fn list_attendance(&self, broadcast_id: &str) -> Result<Vec<Attendance>> {
        let mut conn = get_connection(&self.pool)?;
        attendances::table
            .filter(attendances::broadcast_id.eq(broadcast_id))
            .order(attendances::joined_at.asc())
            .select(AttendanceDB::as_select())
            .load::<AttendanceDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Attendance::try_from)
            .collect()
    }

    fn find_attendance(&self, broadcast_id: &str, user_id: &str) -> Result<Option<Attendance>> {
        let mut conn = get_connection(&self.pool)?;
        attendances::table
            .filter(attendances::broadcast_id.eq(broadcast_id))
            .filter(attendances::user_id.eq(user_id))
            .select(AttendanceDB::as_select())
            .first::<AttendanceDB>(&mut conn)
            .optional()
            .into_core()?
            .map(Attendance::try_from)
            .transpose()
    }

    fn get_question(&self, question_id: &str) -> Result<Question> {
        let mut conn = get_connection(&self.pool)?;
        let row = questions::table
            .find(question_id)
            .select(QuestionDB::as_select())
            .first::<QuestionDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Question {} not found",
                    question_id
                )))
            })?;
        row.try_into()
    }

    fn count_questions(&self, broadcast_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        questions::table
            .filter(questions::broadcast_id.eq(broadcast_id))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }

    fn count_answers(&self, broadcast_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        answers::table
            .filter(answers::broadcast_id.eq(broadcast_id))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }

    async fn record_attendance(&self, broadcast_id: &str, user_id: &str) -> Result<Attendance> {
        let row = AttendanceDB {
            id: Uuid::new_v4().to_string(),
            broadcast_id: broadcast_id.to_string(),
            user_id: user_id.to_string(),
            joined_at: to_db_time(Utc::now()),
            rating: None,
        };

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Attendance> {
                diesel::insert_or_ignore_into(attendances::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let stored = attendances::table
                    .filter(attendances::broadcast_id.eq(&row.broadcast_id))
                    .filter(attendances::user_id.eq(&row.user_id))
                    .select(AttendanceDB::as_select())
                    .first::<AttendanceDB>(conn)
                    .map_err(StorageError::from)?;
                stored.try_into()
            })
            .await
    }

    async fn set_rating(&self, attendance_id: &str, rating: i32) -> Result<Attendance> {
        let id = attendance_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Attendance> {
                let saved = diesel::update(attendances::table.find(&id))
                    .set(attendances::rating.eq(Some(rating)))
                    .returning(AttendanceDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| {
                        Error::Database(DatabaseError::NotFound(format!(
                            "Attendance {} not found",
                            id
                        )))
                    })?;
                saved.try_into()
            })
            .await
    }

    async fn insert_question(&self, question: Question) -> Result<Question> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Question> {
                let saved = diesel::insert_into(questions::table)
                    .values(QuestionDB::from(question))
                    .returning(QuestionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                saved.try_into()
            })
            .await
    }

    async fn insert_answer(&self, answer: Answer) -> Result<Answer> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Answer> {
                let saved = diesel::insert_into(answers::table)
                    .values(AnswerDB::from(answer))
                    .returning(AnswerDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                saved.try_into()
            })
            .await
    }
}
