//! Error types for the conference client.

use eventcast_core::errors::{Error, ProviderFailure};
use serde_json::json;
use thiserror::Error;

/// Result type alias for conference client operations.
pub type Result<T> = std::result::Result<T, ConferenceError>;

#[derive(Debug, Error)]
pub enum ConferenceError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response. `body` is the provider's payload, or the raw
    /// text wrapped as `{"message": ..}` when it is not JSON.
    #[error("API error ({status}): {body}")]
    Api {
        status: u16,
        body: serde_json::Value,
    },

    /// Invalid configuration or request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ConferenceError {
    pub fn api(status: u16, body: serde_json::Value) -> Self {
        Self::Api { status, body }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// The JSON handed back to API callers as the provider response.
    pub fn response_body(&self) -> serde_json::Value {
        match self {
            ConferenceError::Api { body, .. } => body.clone(),
            other => json!({ "message": other.to_string() }),
        }
    }
}

impl From<ConferenceError> for Error {
    fn from(err: ConferenceError) -> Self {
        Error::Provider(ProviderFailure::new(err.response_body()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_passes_provider_body_through() {
        let err = ConferenceError::api(404, json!({ "code": 3001, "message": "Meeting not found" }));
        match Error::from(err) {
            Error::Provider(failure) => {
                assert!(!failure.status);
                assert_eq!(failure.response["code"], 3001);
            }
            other => panic!("expected provider failure, got {other:?}"),
        }
    }

    #[test]
    fn test_local_errors_are_wrapped_as_message() {
        let body = ConferenceError::invalid_request("missing API key").response_body();
        assert_eq!(body["message"], "Invalid request: missing API key");
    }
}
