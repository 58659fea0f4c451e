use std::sync::Arc;

use crate::{
    config::Config,
    domain_events::{RetryPolicy, WebDomainEventSink},
    events::EventBus,
    mailer::SmtpMailer,
    push::PushGateway,
};
use eventcast_conference::{ConferenceClient, ConferenceConfig, OfflineConferenceProvider};
use eventcast_core::{
    broadcasts::{BroadcastService, BroadcastServiceTrait},
    conference::{ConferenceProviderTrait, ConferenceSyncService},
    dispatch::{
        DispatchService, DispatchSettings, NotificationRepositoryTrait, UnsubscribeRepositoryTrait,
    },
    engagement::{EngagementService, EngagementServiceTrait},
    events::DomainEventSink,
    stats::{StatsService, StatsServiceTrait},
};
use eventcast_storage_sqlite::{
    db::{self, write_actor},
    BroadcastRepository, DirectoryRepository, EngagementRepository, NotificationRepository,
    RoleRepository, StatsRepository, UnsubscribeRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Base for the links issued when no conferencing provider is configured.
const OFFLINE_CONFERENCE_BASE_URL: &str = "https://meet.eventcast.local";

pub struct AppState {
    /// Domain event sink for emitting events after mutations.
    /// The services hold their own handle; this one is kept for handlers.
    #[allow(dead_code)]
    pub domain_event_sink: Arc<dyn DomainEventSink>,
    pub broadcast_service: Arc<dyn BroadcastServiceTrait>,
    pub engagement_service: Arc<dyn EngagementServiceTrait>,
    pub stats_service: Arc<dyn StatsServiceTrait>,
    pub directory: Arc<DirectoryRepository>,
    pub notifications: Arc<dyn NotificationRepositoryTrait>,
    pub unsubscribes: Arc<dyn UnsubscribeRepositoryTrait>,
    pub db_path: String,
    pub event_bus: EventBus,
}

pub fn init_tracing() {
    let log_format = std::env::var("EC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn build_conference_provider(config: &Config) -> anyhow::Result<Arc<dyn ConferenceProviderTrait>> {
    match &config.conference_api_url {
        Some(url) => {
            tracing::info!("Conference provider: {}", url);
            let client = ConferenceClient::new(ConferenceConfig::new(
                url.clone(),
                config.conference_api_key.clone(),
            ))?;
            Ok(Arc::new(client))
        }
        None => {
            tracing::warn!("EC_CONFERENCE_API_URL not set; issuing local conference links");
            Ok(Arc::new(OfflineConferenceProvider::new(
                OFFLINE_CONFERENCE_BASE_URL,
            )))
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let directory = Arc::new(DirectoryRepository::new(pool.clone(), writer.clone()));
    let broadcast_repository = Arc::new(BroadcastRepository::new(pool.clone(), writer.clone()));
    let role_repository = Arc::new(RoleRepository::new(pool.clone(), writer.clone()));
    let stats_repository = Arc::new(StatsRepository::new(pool.clone(), writer.clone()));
    let engagement_repository = Arc::new(EngagementRepository::new(pool.clone(), writer.clone()));
    let notification_repository =
        Arc::new(NotificationRepository::new(pool.clone(), writer.clone()));
    let unsubscribe_repository = Arc::new(UnsubscribeRepository::new(pool.clone(), writer.clone()));

    // Domain event sink - two-phase initialization
    // Phase 1: Create the sink (can receive events immediately, buffers until worker starts)
    let domain_event_sink = Arc::new(WebDomainEventSink::new());

    let provider = build_conference_provider(config)?;
    let conference = Arc::new(ConferenceSyncService::new(
        provider,
        role_repository.clone(),
        directory.clone(),
    ));

    let broadcast_service: Arc<dyn BroadcastServiceTrait> = Arc::new(BroadcastService::new(
        broadcast_repository.clone(),
        role_repository.clone(),
        directory.clone(),
        conference.clone(),
        domain_event_sink.clone(),
    ));
    let engagement_service: Arc<dyn EngagementServiceTrait> = Arc::new(EngagementService::new(
        broadcast_repository.clone(),
        engagement_repository.clone(),
        directory.clone(),
        domain_event_sink.clone(),
    ));
    let stats_service: Arc<dyn StatsServiceTrait> = Arc::new(StatsService::new(
        broadcast_repository.clone(),
        role_repository.clone(),
        engagement_repository.clone(),
        stats_repository,
    ));

    let event_bus = EventBus::new(256);

    let dispatch_service = Arc::new(DispatchService::new(
        broadcast_repository.clone(),
        role_repository,
        directory.clone(),
        unsubscribe_repository.clone(),
        notification_repository.clone(),
        Arc::new(SmtpMailer::new(config.smtp.clone())?),
        Arc::new(PushGateway::new(
            config.push_api_url.clone(),
            config.push_access_token.clone(),
        )?),
        Arc::new(event_bus.clone()),
        DispatchSettings {
            from_address: config.mail_from.clone(),
            lease_duration: chrono::Duration::from_std(config.dispatch_lease)?,
            credentials: None,
        },
    ));

    // Domain event sink - Phase 2: Start the worker now that all services are ready
    domain_event_sink.start_worker(
        broadcast_repository,
        conference,
        dispatch_service,
        stats_service.clone(),
        event_bus.clone(),
        RetryPolicy::new(config.task_max_attempts),
    );

    Ok(Arc::new(AppState {
        domain_event_sink,
        broadcast_service,
        engagement_service,
        stats_service,
        directory,
        notifications: notification_repository,
        unsubscribes: unsubscribe_repository,
        db_path,
        event_bus,
    }))
}
