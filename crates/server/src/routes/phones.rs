//! Working-list handlers.
//!
//! Every route is addressed by username. Salespeople may only use their own;
//! admins may use anyone's.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};

use phone_dialer_core::SortOrder;

use super::{Success, authorize_target, read_upload, recognize_for};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::DialerService;
use crate::services::dialer::{CallRecord, ListUpdate};
use crate::services::ocr::is_image_file;
use crate::state::AppState;

/// Largest image accepted for recognition.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Build the working-list router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/{username}/phones",
            get(list_phones).post(add_phone).delete(clear_phones),
        )
        .route("/api/users/{username}/phones/bulk", post(add_bulk))
        .route("/api/users/{username}/phones/extract", post(add_extracted))
        .route("/api/users/{username}/phones/image", post(add_from_image))
        .route("/api/users/{username}/phones/sort", put(sort_phones))
        .route("/api/users/{username}/phones/dedupe", post(dedupe_phones))
        .route(
            "/api/users/{username}/phones/{phone}",
            delete(remove_phone),
        )
        .route("/api/users/{username}/calls", post(record_call))
}

#[derive(Debug, Serialize)]
pub struct PhonesResponse {
    pub phones: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DedupeResponse {
    pub phones: Vec<String>,
    pub removed: usize,
}

#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub phones: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SortRequest {
    #[serde(default)]
    pub order: SortOrder,
}

/// GET /api/users/{username}/phones
async fn list_phones(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PhonesResponse>> {
    let target = authorize_target(&state, &user, &username).await?;
    let phones = DialerService::new(state.store())
        .working_list(&target)
        .await?;
    Ok(Json(PhonesResponse { phones }))
}

/// POST /api/users/{username}/phones
async fn add_phone(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<PhoneRequest>,
) -> Result<Success<ListUpdate>> {
    let target = authorize_target(&state, &user, &username).await?;
    let update = DialerService::new(state.store())
        .add_phone(&target, &body.phone)
        .await?;
    Ok(Success::new(update))
}

/// POST /api/users/{username}/phones/bulk
async fn add_bulk(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<BulkRequest>,
) -> Result<Success<ListUpdate>> {
    let target = authorize_target(&state, &user, &username).await?;
    let update = DialerService::new(state.store())
        .add_bulk(&target, &body.phones)
        .await?;
    Ok(Success::new(update))
}

/// POST /api/users/{username}/phones/extract
async fn add_extracted(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<TextRequest>,
) -> Result<Success<ListUpdate>> {
    let target = authorize_target(&state, &user, &username).await?;
    let update = DialerService::new(state.store())
        .add_extracted(&target, &body.text)
        .await?;
    Ok(Success::new(update))
}

/// POST /api/users/{username}/phones/image
///
/// The in-progress guard is keyed by the logged-in user, not the target.
async fn add_from_image(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
    multipart: Multipart,
) -> Result<Success<ListUpdate>> {
    let target = authorize_target(&state, &user, &username).await?;
    let upload = read_upload(multipart).await?;

    if !is_image_file(&upload.file_name) {
        return Err(AppError::BadRequest(
            "please upload an image file".to_string(),
        ));
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(
            "image is larger than 10 MiB".to_string(),
        ));
    }

    let text = recognize_for(&state, &user.username, &upload.bytes).await?;
    let update = DialerService::new(state.store())
        .add_extracted(&target, &text)
        .await?;
    Ok(Success::new(update))
}

/// DELETE /api/users/{username}/phones/{phone}
async fn remove_phone(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((username, phone)): Path<(String, String)>,
) -> Result<Success<PhonesResponse>> {
    let target = authorize_target(&state, &user, &username).await?;
    let phones = DialerService::new(state.store())
        .remove_phone(&target, &phone)
        .await?;
    Ok(Success::new(PhonesResponse { phones }))
}

/// DELETE /api/users/{username}/phones
async fn clear_phones(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Success<()>> {
    let target = authorize_target(&state, &user, &username).await?;
    DialerService::new(state.store()).clear(&target).await?;
    Ok(Success::empty())
}

/// PUT /api/users/{username}/phones/sort
async fn sort_phones(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Option<Json<SortRequest>>,
) -> Result<Success<PhonesResponse>> {
    let target = authorize_target(&state, &user, &username).await?;
    let order = body.map(|Json(body)| body.order).unwrap_or_default();
    let phones = DialerService::new(state.store())
        .sort(&target, order)
        .await?;
    Ok(Success::new(PhonesResponse { phones }))
}

/// POST /api/users/{username}/phones/dedupe
async fn dedupe_phones(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Success<DedupeResponse>> {
    let target = authorize_target(&state, &user, &username).await?;
    let (phones, removed) = DialerService::new(state.store()).dedupe(&target).await?;
    Ok(Success::new(DedupeResponse { phones, removed }))
}

/// POST /api/users/{username}/calls
async fn record_call(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<PhoneRequest>,
) -> Result<Success<CallRecord>> {
    let target = authorize_target(&state, &user, &username).await?;
    let record = DialerService::new(state.store())
        .record_call(&target, &body.phone)
        .await?;
    Ok(Success::new(record))
}
