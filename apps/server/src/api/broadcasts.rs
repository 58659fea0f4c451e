use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use eventcast_core::{
    broadcasts::{Broadcast, BroadcastAttendees, BroadcastUpdate},
    roles::RoleRecord,
};

use super::{parse_kind, Actor};
use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{CreateBroadcastRequest, ReorderRequest, ResendRequest, ResendResponse},
};

async fn list_broadcasts(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(kind): Path<String>,
) -> ApiResult<Json<Vec<Broadcast>>> {
    let kind = parse_kind(&kind)?;
    let broadcasts = state.broadcast_service.list_broadcasts(&actor, kind)?;
    Ok(Json(broadcasts))
}

async fn create_broadcast(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(kind): Path<String>,
    Json(body): Json<CreateBroadcastRequest>,
) -> ApiResult<Json<Broadcast>> {
    let kind = parse_kind(&kind)?;
    let broadcast = state
        .broadcast_service
        .create_broadcast(&actor, body.into_new(kind))
        .await?;
    Ok(Json(broadcast))
}

async fn get_broadcast(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<Broadcast>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.broadcast_service.get_broadcast(kind, &id)?))
}

async fn update_broadcast(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
    Json(update): Json<BroadcastUpdate>,
) -> ApiResult<Json<Broadcast>> {
    let kind = parse_kind(&kind)?;
    let broadcast = state
        .broadcast_service
        .update_broadcast(&actor, kind, &id, update)
        .await?;
    Ok(Json(broadcast))
}

async fn delete_broadcast(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    state
        .broadcast_service
        .delete_broadcast(&actor, kind, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel_broadcast(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<Broadcast>> {
    let kind = parse_kind(&kind)?;
    let broadcast = state
        .broadcast_service
        .cancel_broadcast(&actor, kind, &id)
        .await?;
    Ok(Json(broadcast))
}

async fn resend_invitations(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
    body: Option<Json<ResendRequest>>,
) -> ApiResult<Json<ResendResponse>> {
    let kind = parse_kind(&kind)?;
    let request = body.map(|Json(inner)| inner).unwrap_or_default();
    let reset_count = state
        .broadcast_service
        .resend_invitations(&actor, kind, &id, request.role_ids)
        .await?;
    Ok(Json(ResendResponse { reset_count }))
}

async fn get_attendees(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<BroadcastAttendees>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.broadcast_service.get_attendees(kind, &id)?))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<RoleRecord>> {
    let kind = parse_kind(&kind)?;
    let record = state
        .broadcast_service
        .register_invitee(&actor, kind, &id)
        .await?;
    Ok(Json(record))
}

async fn deregister(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<RoleRecord>> {
    let kind = parse_kind(&kind)?;
    let record = state
        .broadcast_service
        .deregister_invitee(&actor, kind, &id)
        .await?;
    Ok(Json(record))
}

async fn reorder(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<ReorderRequest>,
) -> ApiResult<Json<BroadcastAttendees>> {
    let kind = parse_kind(&kind)?;
    let attendees = state
        .broadcast_service
        .reorder(&actor, kind, &id, body.role, body.ordered_ids)
        .await?;
    Ok(Json(attendees))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{kind}", get(list_broadcasts).post(create_broadcast))
        .route(
            "/{kind}/{id}",
            get(get_broadcast)
                .put(update_broadcast)
                .delete(delete_broadcast),
        )
        .route("/{kind}/{id}/cancel", post(cancel_broadcast))
        .route("/{kind}/{id}/resend", post(resend_invitations))
        .route("/{kind}/{id}/attendees", get(get_attendees))
        .route("/{kind}/{id}/registration", post(register).delete(deregister))
        .route("/{kind}/{id}/order", put(reorder))
}
