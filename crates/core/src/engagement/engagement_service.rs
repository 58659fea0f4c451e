use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use uuid::Uuid;

use super::engagement_model::{
    validate_body, validate_rating, Answer, Attendance, NewAnswer, NewQuestion, Question,
};
use super::engagement_traits::{EngagementRepositoryTrait, EngagementServiceTrait};
use crate::broadcasts::{Broadcast, BroadcastKind, BroadcastRepositoryTrait};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::users::DirectoryRepositoryTrait;

/// Attendance, ratings and Q&A on launched broadcasts.
pub struct EngagementService {
    broadcasts: Arc<dyn BroadcastRepositoryTrait>,
    repository: Arc<dyn EngagementRepositoryTrait>,
    directory: Arc<dyn DirectoryRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl EngagementService {
    pub fn new(
        broadcasts: Arc<dyn BroadcastRepositoryTrait>,
        repository: Arc<dyn EngagementRepositoryTrait>,
        directory: Arc<dyn DirectoryRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            broadcasts,
            repository,
            directory,
            event_sink,
        }
    }

    fn live_broadcast(&self, kind: BroadcastKind, broadcast_id: &str) -> Result<Broadcast> {
        let broadcast = self.broadcasts.get_by_id(broadcast_id)?;
        if broadcast.kind != kind {
            return Err(Error::NotFound(format!("{} {}", kind.label(), broadcast_id)));
        }
        if !broadcast.is_launched() {
            return Err(Error::InvalidTransition(format!(
                "{} {} is not live",
                kind.label(),
                broadcast_id
            )));
        }
        Ok(broadcast)
    }
}

#[async_trait]
impl EngagementServiceTrait for EngagementService {
    async fn join(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<Attendance> {
        self.live_broadcast(kind, broadcast_id)?;
        let user = self.directory.get_user(actor_id)?;
        let attendance = self
            .repository
            .record_attendance(broadcast_id, &user.id)
            .await?;
        debug!("User {} joined broadcast {}", user.id, broadcast_id);
        self.event_sink
            .emit(DomainEvent::engagement_changed(broadcast_id.to_string()));
        Ok(attendance)
    }

    async fn rate(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        rating: i32,
    ) -> Result<Attendance> {
        validate_rating(rating)?;
        let broadcast = self.broadcasts.get_by_id(broadcast_id)?;
        if broadcast.kind != kind {
            return Err(Error::NotFound(format!("{} {}", kind.label(), broadcast_id)));
        }
        let attendance = self
            .repository
            .find_attendance(broadcast_id, actor_id)?
            .ok_or_else(|| Error::Forbidden("Only attendees can rate a broadcast".to_string()))?;
        let rated = self.repository.set_rating(&attendance.id, rating).await?;
        self.event_sink
            .emit(DomainEvent::engagement_changed(broadcast_id.to_string()));
        Ok(rated)
    }

    async fn ask(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        question: NewQuestion,
    ) -> Result<Question> {
        validate_body(&question.body)?;
        self.live_broadcast(kind, broadcast_id)?;
        let user = self.directory.get_user(actor_id)?;
        let created = self
            .repository
            .insert_question(Question {
                id: Uuid::new_v4().to_string(),
                broadcast_id: broadcast_id.to_string(),
                author_id: user.id,
                body: question.body.trim().to_string(),
                created_at: Utc::now(),
            })
            .await?;
        self.event_sink
            .emit(DomainEvent::engagement_changed(broadcast_id.to_string()));
        Ok(created)
    }

    async fn answer(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        question_id: &str,
        answer: NewAnswer,
    ) -> Result<Answer> {
        validate_body(&answer.body)?;
        self.live_broadcast(kind, broadcast_id)?;
        let question = self.repository.get_question(question_id)?;
        if question.broadcast_id != broadcast_id {
            return Err(Error::NotFound(format!("Question {}", question_id)));
        }
        let user = self.directory.get_user(actor_id)?;
        let created = self
            .repository
            .insert_answer(Answer {
                id: Uuid::new_v4().to_string(),
                question_id: question.id,
                broadcast_id: broadcast_id.to_string(),
                author_id: user.id,
                body: answer.body.trim().to_string(),
                created_at: Utc::now(),
            })
            .await?;
        self.event_sink
            .emit(DomainEvent::engagement_changed(broadcast_id.to_string()));
        Ok(created)
    }
}
