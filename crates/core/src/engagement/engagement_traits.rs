use async_trait::async_trait;

use crate::broadcasts::BroadcastKind;
use crate::engagement::engagement_model::{Answer, Attendance, NewAnswer, NewQuestion, Question};
use crate::errors::Result;

#[async_trait]
pub trait EngagementRepositoryTrait: Send + Sync {
    fn list_attendance(&self, broadcast_id: &str) -> Result<Vec<Attendance>>;
    fn find_attendance(&self, broadcast_id: &str, user_id: &str) -> Result<Option<Attendance>>;
    fn get_question(&self, question_id: &str) -> Result<Question>;
    fn count_questions(&self, broadcast_id: &str) -> Result<i64>;
    fn count_answers(&self, broadcast_id: &str) -> Result<i64>;

    /// Records attendance once per (broadcast, user); repeats return the existing row.
    async fn record_attendance(&self, broadcast_id: &str, user_id: &str) -> Result<Attendance>;
    async fn set_rating(&self, attendance_id: &str, rating: i32) -> Result<Attendance>;
    async fn insert_question(&self, question: Question) -> Result<Question>;
    async fn insert_answer(&self, answer: Answer) -> Result<Answer>;
}

#[async_trait]
pub trait EngagementServiceTrait: Send + Sync {
    async fn join(&self, actor_id: &str, kind: BroadcastKind, broadcast_id: &str)
        -> Result<Attendance>;
    async fn rate(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        rating: i32,
    ) -> Result<Attendance>;
    async fn ask(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        question: NewQuestion,
    ) -> Result<Question>;
    async fn answer(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        question_id: &str,
        answer: NewAnswer,
    ) -> Result<Answer>;
}
