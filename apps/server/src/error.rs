use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eventcast_core::errors::{DatabaseError, Error as CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
    /// Provider payload, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<serde_json::Value>,
}

impl ErrorBody {
    fn new(status: StatusCode, message: String) -> Self {
        Self {
            code: status.as_u16(),
            message,
            errors: None,
            response: None,
        }
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::NotFound(_) | CoreError::Database(DatabaseError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        CoreError::InvalidTransition(_) | CoreError::DispatchInProgress(_) => StatusCode::CONFLICT,
        CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
        CoreError::Provider(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Core(e) => {
                let status = core_status(e);
                let mut body = ErrorBody::new(status, e.to_string());
                match e {
                    CoreError::Validation(ValidationError::Fields(fields)) => {
                        body.message = "Validation failed".to_string();
                        body.errors = Some(fields.fields().clone());
                    }
                    CoreError::Provider(failure) => {
                        body.response = Some(failure.response.clone());
                    }
                    _ => {}
                }
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", e);
                }
                (status, body)
            }
            ApiError::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(StatusCode::BAD_REQUEST, reason.clone()),
            ),
            ApiError::Unauthorized(reason) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new(StatusCode::UNAUTHORIZED, reason.clone()),
            ),
            ApiError::Internal(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ),
            ApiError::Anyhow(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use eventcast_core::errors::ProviderFailure;
    use serde_json::json;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_field_errors_are_keyed() {
        let err = ApiError::from(CoreError::field("hosts", "User(s) u9 does not exist"));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["errors"]["hosts"][0], "User(s) u9 does not exist");
    }

    #[tokio::test]
    async fn test_provider_payload_passes_through() {
        let failure = ProviderFailure::new(json!({ "code": 3001, "message": "Meeting not found" }));
        let (status, body) = body_of(ApiError::from(CoreError::Provider(failure))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["response"]["code"], 3001);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (CoreError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                CoreError::Database(DatabaseError::NotFound("b1".into())),
                StatusCode::NOT_FOUND,
            ),
            (CoreError::InvalidTransition("x".into()), StatusCode::CONFLICT),
            (CoreError::DispatchInProgress("b1".into()), StatusCode::CONFLICT),
            (CoreError::Transport("smtp".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(core_status(&err), expected);
        }
    }
}
