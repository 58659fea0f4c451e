//! Mobile push delivery through an HTTP push gateway.

use std::time::Duration;

use async_trait::async_trait;
use eventcast_core::dispatch::{PushGatewayTrait, PushMessage};
use eventcast_core::errors::{Error, Result};
use serde::Serialize;
use serde_json::Value;

const PUSH_TIMEOUT_SECS: u64 = 15;

/// One entry of the gateway's batch request.
#[derive(Debug, Serialize, PartialEq)]
struct GatewayMessage<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    data: &'a Value,
    sound: &'static str,
}

fn gateway_batch(message: &PushMessage) -> Vec<GatewayMessage<'_>> {
    message
        .tokens
        .iter()
        .map(|token| GatewayMessage {
            to: token,
            title: &message.title,
            body: &message.body,
            data: &message.data,
            sound: "default",
        })
        .collect()
}

/// Posts push batches to the configured gateway. Without a gateway URL
/// pushes are logged and dropped.
pub struct PushGateway {
    client: reqwest::Client,
    url: Option<String>,
    access_token: Option<String>,
}

impl PushGateway {
    pub fn new(url: Option<String>, access_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PUSH_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build push client: {}", e)))?;
        Ok(Self {
            client,
            url,
            access_token,
        })
    }
}

#[async_trait]
impl PushGatewayTrait for PushGateway {
    async fn push(&self, message: &PushMessage) -> Result<()> {
        let Some(url) = &self.url else {
            tracing::debug!(
                "Push gateway not configured; dropping push to {} device(s)",
                message.tokens.len()
            );
            return Ok(());
        };
        if message.tokens.is_empty() {
            return Ok(());
        }

        let mut request = self.client.post(url).json(&gateway_batch(message));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Push request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "Push gateway returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}
