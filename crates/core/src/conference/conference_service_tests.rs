#[cfg(test)]
mod tests {
    use crate::audience::{AudienceMember, AudienceRequest, ExternalGuest};
    use crate::broadcasts::{Broadcast, BroadcastKind, BroadcastServiceTrait};
    use crate::conference::ConferenceSyncTrait;
    use crate::errors::Error;
    use crate::roles::RoleKind;
    use crate::testing::{new_broadcast, users, Harness};

    async fn live(h: &Harness, audience: AudienceRequest) -> Broadcast {
        h.broadcasts
            .create_broadcast("u1", new_broadcast(BroadcastKind::Webinar, audience, true))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_update_reuses_conference() {
        let h = Harness::new();
        let mut broadcast = h
            .broadcasts
            .create_broadcast(
                "u1",
                new_broadcast(BroadcastKind::Webcast, AudienceRequest::default(), false),
            )
            .await
            .unwrap();

        let links = h.conference.create_or_update(&broadcast).await.unwrap();
        assert_eq!(links.conference_id, "conf-1");
        assert_eq!(links.presenter_url.as_deref(), Some("https://conf.test/p/1"));
        broadcast.apply_conference(links);

        let links = h.conference.create_or_update(&broadcast).await.unwrap();
        assert_eq!(links.conference_id, "conf-1");
        assert_eq!(h.provider.count("create:"), 1);
        assert_eq!(h.provider.count("update:conf-1"), 1);
        assert_eq!(h.provider.count("admin:conf-1"), 2);
    }

    #[tokio::test]
    async fn test_pre_register_continues_past_failures() {
        let h = Harness::new();
        h.store.add_user("u2", "acc", "two@example.com");
        h.store.add_user("u3", "acc", "three@example.com");
        let broadcast = live(
            &h,
            AudienceRequest {
                participants: users(&["u2", "u3"]),
                external_participants: vec![ExternalGuest {
                    first_name: Some("Ada".to_string()),
                    last_name: Some("Byron".to_string()),
                    ..ExternalGuest::new("ada@partner.io")
                }],
                invitees: users(&["u2"]),
                rsvps: vec![AudienceMember::guest("rsvp@partner.io")],
                ..Default::default()
            },
        )
        .await;
        h.provider.fail_registration_of("three@example.com");

        let report = h.conference.pre_register(&broadcast).await.unwrap();

        // two internal participants, one guest, one rsvp
        assert_eq!(report.registered.len(), 3);
        assert_eq!(report.failed.len(), 1);
        let roles = h.store.roles_of(&broadcast.id);
        let failed = roles.iter().find(|r| r.id == report.failed[0].0).unwrap();
        assert!(failed.conference_url.is_none());
        assert!(roles
            .iter()
            .filter(|r| r.role == RoleKind::Invitee)
            .all(|r| r.conference_url.is_none()));
        assert_eq!(h.provider.count("register:two@example.com"), 1);
    }

    #[tokio::test]
    async fn test_pre_register_skips_already_registered() {
        let h = Harness::new();
        h.store.add_user("u2", "acc", "two@example.com");
        let broadcast = live(
            &h,
            AudienceRequest {
                participants: users(&["u2"]),
                ..Default::default()
            },
        )
        .await;

        h.conference.pre_register(&broadcast).await.unwrap();
        let second = h.conference.pre_register(&broadcast).await.unwrap();

        assert!(second.registered.is_empty());
        assert_eq!(h.provider.count("register:"), 1);
    }

    #[tokio::test]
    async fn test_registration_requires_conference() {
        let h = Harness::new();
        h.store.add_user("u2", "acc", "two@example.com");
        let draft = h
            .broadcasts
            .create_broadcast(
                "u1",
                new_broadcast(
                    BroadcastKind::Webinar,
                    AudienceRequest {
                        invitees: users(&["u2"]),
                        ..Default::default()
                    },
                    false,
                ),
            )
            .await
            .unwrap();
        let record = h
            .store
            .roles_of(&draft.id)
            .into_iter()
            .find(|r| r.role == RoleKind::Invitee)
            .unwrap();

        let err = h.conference.register(&draft, &record).await.unwrap_err();

        assert!(matches!(err, Error::InvalidTransition(_)));
        assert!(h.provider.calls().is_empty());
    }
}
