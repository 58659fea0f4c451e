use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use eventcast_core::{
    engagement::{Answer, Attendance, NewAnswer, NewQuestion, Question},
    stats::BroadcastStats,
};

use super::{parse_kind, Actor};
use crate::{error::ApiResult, main_lib::AppState, models::RatingRequest};

async fn join(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<Attendance>> {
    let kind = parse_kind(&kind)?;
    let attendance = state.engagement_service.join(&actor, kind, &id).await?;
    Ok(Json(attendance))
}

async fn rate(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<RatingRequest>,
) -> ApiResult<Json<Attendance>> {
    let kind = parse_kind(&kind)?;
    let attendance = state
        .engagement_service
        .rate(&actor, kind, &id, body.rating)
        .await?;
    Ok(Json(attendance))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id)): Path<(String, String)>,
    Json(body): Json<NewQuestion>,
) -> ApiResult<Json<Question>> {
    let kind = parse_kind(&kind)?;
    let question = state.engagement_service.ask(&actor, kind, &id, body).await?;
    Ok(Json(question))
}

async fn answer(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path((kind, id, question_id)): Path<(String, String, String)>,
    Json(body): Json<NewAnswer>,
) -> ApiResult<Json<Answer>> {
    let kind = parse_kind(&kind)?;
    let answer = state
        .engagement_service
        .answer(&actor, kind, &id, &question_id, body)
        .await?;
    Ok(Json(answer))
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<BroadcastStats>> {
    let kind = parse_kind(&kind)?;
    // Resolves the broadcast first so a kind mismatch is a 404.
    let broadcast = state.broadcast_service.get_broadcast(kind, &id)?;
    Ok(Json(state.stats_service.get_stats(&broadcast.id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{kind}/{id}/attendance", post(join))
        .route("/{kind}/{id}/rating", post(rate))
        .route("/{kind}/{id}/questions", post(ask))
        .route("/{kind}/{id}/questions/{question_id}/answers", post(answer))
        .route("/{kind}/{id}/stats", get(get_stats))
}
