use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::main_lib::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Readiness {
    status: &'static str,
    db_path: String,
}

/// Ready once the database file is reachable.
async fn readyz(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Readiness>) {
    let reachable = std::path::Path::new(&state.db_path).exists();
    let status = if reachable {
        StatusCode::OK
    } else {
        tracing::warn!("Database file {} is missing", state.db_path);
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(Readiness {
            status: if reachable { "ok" } else { "unavailable" },
            db_path: state.db_path.clone(),
        }),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
