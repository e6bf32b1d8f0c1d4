//! Health checks.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/api/health", get(status))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub port: u16,
    pub data_dir: String,
}

/// GET /health
async fn liveness() -> &'static str {
    "ok"
}

/// GET /api/health
async fn status(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
        port: state.config().port,
        data_dir: state.store().dir().display().to_string(),
    })
}
