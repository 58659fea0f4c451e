#[cfg(test)]
mod tests {
    use crate::audience::{AudienceMember, AudienceRequest};
    use crate::broadcasts::{BroadcastKind, BroadcastServiceTrait, FileRef, NewBroadcast};
    use crate::engagement::{EngagementServiceTrait, NewQuestion};
    use crate::stats::StatsServiceTrait;
    use crate::testing::{new_broadcast, users, Harness};

    const KIND: BroadcastKind = BroadcastKind::Webinar;

    fn input() -> NewBroadcast {
        let mut input = new_broadcast(
            KIND,
            AudienceRequest {
                participants: vec![
                    AudienceMember::user("u2"),
                    AudienceMember::guest("guest@partner.io"),
                ],
                rsvps: users(&["u2"]),
                ..Default::default()
            },
            true,
        );
        input.files = vec![FileRef {
            name: "agenda.pdf".to_string(),
            url: "https://files.test/agenda.pdf".to_string(),
            content_type: None,
        }];
        input
    }

    #[tokio::test]
    async fn test_created_broadcast_starts_with_empty_stats() {
        let h = Harness::new();
        h.store.add_user("u2", "acc", "two@example.com");
        let live = h.broadcasts.create_broadcast("u1", input()).await.unwrap();

        let stats = h.stats.get_stats(&live.id).unwrap();

        assert_eq!(stats.hosts, 0);
        assert_eq!(stats.average_rating, None);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let h = Harness::new();
        h.store.add_user("u2", "acc", "two@example.com");
        let live = h.broadcasts.create_broadcast("u1", input()).await.unwrap();
        h.engagement.join("u2", KIND, &live.id).await.unwrap();
        h.engagement.rate("u2", KIND, &live.id, 3).await.unwrap();
        h.engagement.join("u1", KIND, &live.id).await.unwrap();
        h.engagement.rate("u1", KIND, &live.id, 4).await.unwrap();
        h.engagement
            .ask(
                "u2",
                KIND,
                &live.id,
                NewQuestion {
                    body: "Is this recorded?".to_string(),
                },
            )
            .await
            .unwrap();

        let first = h.stats.recompute(&live.id).await.unwrap();
        let second = h.stats.recompute(&live.id).await.unwrap();

        assert!(first.same_counts(&second));
        assert_eq!(first.hosts, 0);
        assert_eq!(first.participants, 2);
        assert_eq!(first.rsvps, 1);
        assert_eq!(first.attendees, 2);
        assert_eq!(first.questions, 1);
        assert_eq!(first.answers, 0);
        assert_eq!(first.files, 1);
        assert_eq!(first.average_rating, Some(3.5));
        assert!(h.stats.get_stats(&live.id).unwrap().same_counts(&first));
    }
}
