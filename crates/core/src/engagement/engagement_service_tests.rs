#[cfg(test)]
mod tests {
    use crate::audience::AudienceRequest;
    use crate::broadcasts::{Broadcast, BroadcastKind, BroadcastServiceTrait};
    use crate::engagement::{
        EngagementRepositoryTrait, EngagementServiceTrait, NewAnswer, NewQuestion,
    };
    use crate::errors::{DatabaseError, Error, ValidationError};
    use crate::events::DomainEvent;
    use crate::testing::{new_broadcast, Harness};

    const KIND: BroadcastKind = BroadcastKind::Webinar;

    async fn broadcast(h: &Harness, launch: bool) -> Broadcast {
        h.store.add_user("u2", "acc", "two@example.com");
        h.broadcasts
            .create_broadcast("u1", new_broadcast(KIND, AudienceRequest::default(), launch))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let h = Harness::new();
        let live = broadcast(&h, true).await;

        let first = h.engagement.join("u2", KIND, &live.id).await.unwrap();
        let second = h.engagement.join("u2", KIND, &live.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(h
            .sink
            .events()
            .contains(&DomainEvent::engagement_changed(live.id.clone())));
    }

    #[tokio::test]
    async fn test_attendance_is_keyed_by_user() {
        let h = Harness::new();
        let live = broadcast(&h, true).await;

        let err = h
            .engagement
            .join("guest@partner.io", KIND, &live.id)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
        assert!(h.store.list_attendance(&live.id).unwrap().is_empty());

        h.engagement.join("u2", KIND, &live.id).await.unwrap();
        let attendance = h.store.list_attendance(&live.id).unwrap();
        assert_eq!(attendance.len(), 1);
        assert_eq!(attendance[0].user_id, "u2");
    }

    #[tokio::test]
    async fn test_drafts_are_not_live() {
        let h = Harness::new();
        let draft = broadcast(&h, false).await;

        let err = h.engagement.join("u2", KIND, &draft.id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));

        let err = h
            .engagement
            .join("u2", BroadcastKind::Webcast, &draft.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_attendees_rate_within_bounds() {
        let h = Harness::new();
        let live = broadcast(&h, true).await;

        let err = h.engagement.rate("u2", KIND, &live.id, 4).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        h.engagement.join("u2", KIND, &live.id).await.unwrap();
        let err = h.engagement.rate("u2", KIND, &live.id, 6).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::Fields(_))));

        let rated = h.engagement.rate("u2", KIND, &live.id, 4).await.unwrap();
        assert_eq!(rated.rating, Some(4));
    }

    #[tokio::test]
    async fn test_questions_and_answers() {
        let h = Harness::new();
        let live = broadcast(&h, true).await;

        let question = h
            .engagement
            .ask(
                "u2",
                KIND,
                &live.id,
                NewQuestion {
                    body: "  Will slides be shared? ".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(question.body, "Will slides be shared?");

        let answer = h
            .engagement
            .answer(
                "u1",
                KIND,
                &live.id,
                &question.id,
                NewAnswer {
                    body: "Yes, after the session.".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(answer.question_id, question.id);

        let err = h
            .engagement
            .ask(
                "u2",
                KIND,
                &live.id,
                NewQuestion {
                    body: "   ".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_answer_must_target_question_of_same_broadcast() {
        let h = Harness::new();
        let live = broadcast(&h, true).await;
        let other = h
            .broadcasts
            .create_broadcast("u1", new_broadcast(KIND, AudienceRequest::default(), true))
            .await
            .unwrap();
        let question = h
            .engagement
            .ask(
                "u2",
                KIND,
                &other.id,
                NewQuestion {
                    body: "Where is the recording?".to_string(),
                },
            )
            .await
            .unwrap();

        let err = h
            .engagement
            .answer(
                "u1",
                KIND,
                &live.id,
                &question.id,
                NewAnswer {
                    body: "Here.".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }
}
