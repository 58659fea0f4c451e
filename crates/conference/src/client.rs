//! Conferencing provider API client.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;

use eventcast_core::conference::{
    ConferenceDetails, ConferencePayload, ConferenceProviderTrait, Registrant,
};

use crate::error::{ConferenceError, Result};
use crate::types::*;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the account API key.
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct ConferenceConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ConferenceConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Client for the conferencing provider.
///
/// Non-success responses become [`ConferenceError::Api`] carrying the
/// provider's JSON body, which the core passes through to API callers.
#[derive(Debug, Clone)]
pub struct ConferenceClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl ConferenceClient {
    pub fn new(config: ConferenceConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ConferenceError::invalid_request("API key is empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ConferenceError::invalid_request("Invalid API key format"))?;
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Conference API response ({}): {}", status, body);
        decode(status, &body)
    }

    async fn expect_success(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(());
        }
        Err(api_error(status, &body))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conferences
    // ─────────────────────────────────────────────────────────────────────────

    /// POST /conferences
    pub async fn create(&self, request: &ConferenceRequest) -> Result<ConferenceResponse> {
        debug!("Creating conference '{}'", request.topic);
        let response = self
            .client
            .post(self.url("/conferences"))
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// PUT /conferences/{id}
    pub async fn update(
        &self,
        conference_id: &str,
        request: &ConferenceRequest,
    ) -> Result<ConferenceResponse> {
        debug!("Updating conference {}", conference_id);
        let response = self
            .client
            .put(self.url(&format!("/conferences/{}", encode(conference_id))))
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// GET /conferences/{id}/admin-url
    pub async fn admin_url(&self, conference_id: &str) -> Result<AdminUrlResponse> {
        let response = self
            .client
            .get(self.url(&format!("/conferences/{}/admin-url", encode(conference_id))))
            .headers(self.headers.clone())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// DELETE /conferences/{id}
    pub async fn delete(&self, conference_id: &str) -> Result<()> {
        debug!("Deleting conference {}", conference_id);
        let response = self
            .client
            .delete(self.url(&format!("/conferences/{}", encode(conference_id))))
            .headers(self.headers.clone())
            .send()
            .await?;
        Self::expect_success(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registrants
    // ─────────────────────────────────────────────────────────────────────────

    /// PUT /conferences/{id}/registrants
    pub async fn add_registrant(
        &self,
        conference_id: &str,
        request: &RegistrantRequest,
    ) -> Result<RegistrantResponse> {
        let response = self
            .client
            .put(self.url(&format!("/conferences/{}/registrants", encode(conference_id))))
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// DELETE /conferences/{id}/registrants/{email}
    pub async fn remove_registrant(&self, conference_id: &str, email: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!(
                "/conferences/{}/registrants/{}",
                encode(conference_id),
                encode(email)
            )))
            .headers(self.headers.clone())
            .send()
            .await?;
        Self::expect_success(response).await
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn api_error(status: StatusCode, body: &str) -> ConferenceError {
    let payload = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .filter(|v| v.is_object())
        .unwrap_or_else(|| json!({ "message": body }));
    ConferenceError::api(status.as_u16(), payload)
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        return Err(api_error(status, body));
    }
    serde_json::from_str(body).map_err(|e| {
        error!(
            "Failed to deserialize conference response. Body: {}, Error: {}",
            body, e
        );
        ConferenceError::from(e)
    })
}

#[async_trait]
impl ConferenceProviderTrait for ConferenceClient {
    async fn create_conference(
        &self,
        payload: &ConferencePayload,
    ) -> eventcast_core::Result<ConferenceDetails> {
        let created = self.create(&ConferenceRequest::from(payload)).await?;
        Ok(created.into())
    }

    async fn update_conference(
        &self,
        conference_id: &str,
        payload: &ConferencePayload,
    ) -> eventcast_core::Result<ConferenceDetails> {
        let updated = self
            .update(conference_id, &ConferenceRequest::from(payload))
            .await?;
        Ok(updated.into())
    }

    async fn fetch_admin_url(&self, conference_id: &str) -> eventcast_core::Result<String> {
        Ok(self.admin_url(conference_id).await?.admin_url)
    }

    async fn delete_conference(&self, conference_id: &str) -> eventcast_core::Result<()> {
        Ok(self.delete(conference_id).await?)
    }

    async fn register_attendee(
        &self,
        conference_id: &str,
        registrant: &Registrant,
    ) -> eventcast_core::Result<String> {
        let registered = self
            .add_registrant(conference_id, &RegistrantRequest::from(registrant))
            .await?;
        Ok(registered.join_url)
    }

    async fn deregister_attendee(
        &self,
        conference_id: &str,
        email: &str,
    ) -> eventcast_core::Result<()> {
        Ok(self.remove_registrant(conference_id, email).await?)
    }
}

impl From<ConferenceResponse> for ConferenceDetails {
    fn from(response: ConferenceResponse) -> Self {
        ConferenceDetails {
            conference_id: response.id,
            conference_address: response.join_url,
            presenter_url: response.start_url,
        }
    }
}
