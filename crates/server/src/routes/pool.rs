//! Shared pool, assignment and distribution handlers.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use phone_dialer_core::Assignments;

use super::{Success, read_upload, recognize_for};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::services::PoolService;
use crate::services::ocr::{extension, is_image_file};
use crate::services::pool::{DistributionOutcome, ImportOutcome, PoolStats};
use crate::state::AppState;

/// Build the pool router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/phonePool",
            get(get_pool).put(replace_pool).delete(clear_pool),
        )
        .route("/api/phonePool/import", post(import_text))
        .route("/api/phonePool/upload", post(import_upload))
        .route(
            "/api/assignments",
            get(get_assignments).put(replace_assignments),
        )
        .route("/api/distribute", post(distribute))
        .route("/api/stats", get(stats))
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Count of new numbers.
    pub added: usize,
    /// Pool size after the import.
    pub total: usize,
    /// The new numbers.
    pub phones: Vec<String>,
}

impl From<ImportOutcome> for ImportResponse {
    fn from(outcome: ImportOutcome) -> Self {
        Self {
            added: outcome.added.len(),
            total: outcome.total,
            phones: outcome.added,
        }
    }
}

/// GET /api/phonePool
async fn get_pool(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>> {
    Ok(Json(PoolService::new(state.store()).pool().await?))
}

/// PUT /api/phonePool
async fn replace_pool(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(phones): Json<Vec<String>>,
) -> Result<Json<Vec<String>>> {
    Ok(Json(PoolService::new(state.store()).replace(phones).await?))
}

/// DELETE /api/phonePool
async fn clear_pool(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Success<()>> {
    PoolService::new(state.store()).clear().await?;
    Ok(Success::empty())
}

/// POST /api/phonePool/import
async fn import_text(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<ImportRequest>,
) -> Result<Success<ImportResponse>> {
    let outcome = PoolService::new(state.store())
        .import_text(&body.text)
        .await?;
    Ok(Success::new(outcome.into()))
}

/// POST /api/phonePool/upload
///
/// Text and CSV files are imported as text; images are recognized first.
async fn import_upload(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Success<ImportResponse>> {
    let upload = read_upload(multipart).await?;

    let text = match extension(&upload.file_name).as_deref() {
        Some("txt" | "csv") => String::from_utf8_lossy(&upload.bytes).into_owned(),
        _ if is_image_file(&upload.file_name) => {
            recognize_for(&state, &admin.username, &upload.bytes).await?
        }
        _ => {
            return Err(AppError::BadRequest(format!(
                "unsupported file type: '{}'",
                upload.file_name
            )));
        }
    };

    tracing::info!(
        file = %upload.file_name,
        bytes = upload.bytes.len(),
        "Importing uploaded file into pool"
    );
    let outcome = PoolService::new(state.store()).import_text(&text).await?;
    Ok(Success::new(outcome.into()))
}

/// GET /api/assignments
async fn get_assignments(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Assignments>> {
    Ok(Json(PoolService::new(state.store()).assignments().await?))
}

/// PUT /api/assignments
async fn replace_assignments(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(assignments): Json<Assignments>,
) -> Result<Success<()>> {
    PoolService::new(state.store())
        .replace_assignments(&assignments)
        .await?;
    Ok(Success::empty())
}

/// POST /api/distribute
async fn distribute(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Success<DistributionOutcome>> {
    let mut rng = StdRng::from_os_rng();
    let outcome = PoolService::new(state.store()).distribute(&mut rng).await?;
    tracing::info!(by = %admin.username, "Distribution requested");
    Ok(Success::new(outcome))
}

/// GET /api/stats
async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<PoolStats>> {
    Ok(Json(PoolService::new(state.store()).stats().await?))
}
