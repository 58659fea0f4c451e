use std::{net::SocketAddr, time::Duration};

/// SMTP relay settings. Mail is logged instead of sent when `host` is unset.
#[derive(Clone, Debug, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Conferencing provider API. Links are issued locally when unset.
    pub conference_api_url: Option<String>,
    pub conference_api_key: String,
    pub smtp: SmtpConfig,
    pub mail_from: String,
    pub push_api_url: Option<String>,
    pub push_access_token: Option<String>,
    /// Attempts per background task before it is given up.
    pub task_max_attempts: u32,
    pub dispatch_lease: Duration,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_parse(
            "EC_LISTEN_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        );
        let db_path = env_opt("EC_DB_PATH").unwrap_or_else(|| "./db/eventcast.db".into());
        let cors_allow = std::env::var("EC_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_parse("EC_REQUEST_TIMEOUT_MS", 30000);
        let lease_secs: u64 = env_parse(
            "EC_DISPATCH_LEASE_SECS",
            eventcast_core::constants::DEFAULT_DISPATCH_LEASE_SECS as u64,
        );
        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            conference_api_url: env_opt("EC_CONFERENCE_API_URL"),
            conference_api_key: env_opt("EC_CONFERENCE_API_KEY").unwrap_or_default(),
            smtp: SmtpConfig {
                host: env_opt("EC_SMTP_HOST"),
                port: env_parse("EC_SMTP_PORT", 587),
                username: env_opt("EC_SMTP_USERNAME"),
                password: env_opt("EC_SMTP_PASSWORD"),
            },
            mail_from: env_opt("EC_MAIL_FROM")
                .unwrap_or_else(|| eventcast_core::constants::DEFAULT_FROM_ADDRESS.to_string()),
            push_api_url: env_opt("EC_PUSH_API_URL"),
            push_access_token: env_opt("EC_PUSH_ACCESS_TOKEN"),
            task_max_attempts: env_parse("EC_TASK_MAX_ATTEMPTS", 5u32).max(1),
            dispatch_lease: Duration::from_secs(lease_secs),
        }
    }
}
