use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use eventcast_core::dispatch::NotificationRecord;

use super::Actor;
use crate::{error::ApiResult, main_lib::AppState, models::UnsubscribeRequest};

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
) -> ApiResult<Json<Vec<NotificationRecord>>> {
    Ok(Json(state.notifications.list_for_user(&actor)?))
}

async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UnsubscribeRequest>,
) -> ApiResult<StatusCode> {
    state.unsubscribes.unsubscribe(&body.email, body.kind).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn resubscribe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UnsubscribeRequest>,
) -> ApiResult<StatusCode> {
    state.unsubscribes.resubscribe(&body.email, body.kind).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/unsubscribes", post(unsubscribe).delete(resubscribe))
}
