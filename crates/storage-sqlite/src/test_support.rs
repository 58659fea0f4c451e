//! Shared fixtures for repository tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use eventcast_core::broadcasts::{Broadcast, BroadcastKind, Visibility};
use eventcast_core::users::{Account, DirectoryRepositoryTrait, NewUser};

use crate::db::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::directory::DirectoryRepository;

pub(crate) struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: TempDir,
}

pub(crate) async fn setup() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db").to_string_lossy().to_string();
    crate::db::init(&db_path).expect("Failed to init database");
    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());
    TestDb {
        pool,
        writer,
        _dir: dir,
    }
}

impl TestDb {
    pub fn directory(&self) -> DirectoryRepository {
        DirectoryRepository::new(Arc::clone(&self.pool), self.writer.clone())
    }

    /// Seeds account `acc` with the given user ids (`<id>@example.com`).
    pub async fn seed_users(&self, ids: &[&str]) {
        let directory = self.directory();
        directory
            .create_account(Account {
                id: "acc".into(),
                name: "Account".into(),
                primary_account_id: None,
            })
            .await
            .expect("Failed to create account");
        for id in ids {
            directory
                .create_user(NewUser {
                    id: Some(id.to_string()),
                    account_id: "acc".into(),
                    email: format!("{}@example.com", id),
                    first_name: id.to_uppercase(),
                    last_name: "Tester".into(),
                })
                .await
                .expect("Failed to create user");
        }
    }
}

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 3, 16, 0, 0).unwrap()
}

pub(crate) fn broadcast(id: &str, creator_id: &str) -> Broadcast {
    let now = Utc::now();
    Broadcast {
        id: id.to_string(),
        kind: BroadcastKind::Webinar,
        account_id: "acc".into(),
        creator_id: creator_id.to_string(),
        title: "Quarterly review".into(),
        description: Some("Numbers, then questions".into()),
        start_at: start(),
        end_at: start() + Duration::minutes(60),
        visibility: Visibility::Public,
        is_draft: true,
        is_cancelled: false,
        in_process: false,
        lease_expires_at: None,
        creator_notified: false,
        conference_id: None,
        join_url: None,
        admin_url: None,
        presenter_url: None,
        cc_emails: vec!["ops@example.com".into()],
        files: vec![],
        created_at: now,
        updated_at: now,
    }
}
