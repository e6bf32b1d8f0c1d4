//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//! GET    /api/health                          - Status, time, port, data dir
//!
//! # Auth
//! POST   /api/auth/login                      - Log in (username, password, role)
//! POST   /api/auth/logout                     - End the session
//! GET    /api/auth/session                    - Current user or 401
//!
//! # Accounts (admin)
//! GET    /api/users                           - User table
//! PUT    /api/users                           - Replace user table
//! POST   /api/users                           - Create account
//! DELETE /api/users/{username}                - Delete account
//!
//! # Pool and distribution (admin)
//! GET    /api/phonePool                       - Pool
//! PUT    /api/phonePool                       - Replace pool
//! DELETE /api/phonePool                       - Empty pool
//! POST   /api/phonePool/import                - Extract numbers from text
//! POST   /api/phonePool/upload                - Import a text file or image
//! GET    /api/assignments                     - Current assignment
//! PUT    /api/assignments                     - Replace assignment
//! POST   /api/distribute                      - Distribute the pool
//! GET    /api/stats                           - Dashboard counters
//!
//! # Working lists (self, or admin for anyone)
//! GET    /api/users/{username}/phones         - Assigned + personal numbers
//! POST   /api/users/{username}/phones         - Add one number
//! DELETE /api/users/{username}/phones         - Clear personal list
//! POST   /api/users/{username}/phones/bulk    - Add several numbers
//! POST   /api/users/{username}/phones/extract - Add mobiles found in text
//! POST   /api/users/{username}/phones/image   - Add mobiles found in an image
//! PUT    /api/users/{username}/phones/sort    - Numeric sort
//! POST   /api/users/{username}/phones/dedupe  - Drop repeats
//! DELETE /api/users/{username}/phones/{phone} - Remove one number
//! POST   /api/users/{username}/calls          - Record a call
//! GET    /api/userData/{username}             - Call data
//! PUT    /api/userData/{username}             - Replace call data
//!
//! # Data (admin)
//! DELETE /api/data/clear                      - Delete every document
//! ```

pub mod auth;
pub mod data;
pub mod health;
pub mod phones;
pub mod pool;
pub mod user_data;
pub mod users;

use axum::{
    Router,
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use phone_dialer_core::Username;

use crate::error::AppError;
use crate::models::CurrentUser;
use crate::services::{AccountService, ServiceError};
use crate::state::AppState;

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(pool::router())
        .merge(phones::router())
        .merge(user_data::router())
        .merge(data::router())
}

/// `{ "success": true, ...body }`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

impl<T: Serialize> Success<T> {
    /// Wrap `body` in a success envelope.
    pub const fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

impl Success<()> {
    /// A bare `{ "success": true }`.
    pub const fn empty() -> Self {
        Self::new(())
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

/// Resolve the `{username}` path segment and check that `user` may act on it.
///
/// # Errors
///
/// Returns `BadRequest` for a malformed username, `Forbidden` when a
/// salesperson addresses someone else, and `NotFound` for an unknown account.
pub async fn authorize_target(
    state: &AppState,
    user: &CurrentUser,
    raw: &str,
) -> Result<Username, AppError> {
    let target = Username::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !user.may_act_on(&target) {
        tracing::warn!(
            username = %user.username,
            target = %target,
            "Refused access to another user's list"
        );
        return Err(AppError::Forbidden(
            "you can only manage your own phone list".to_string(),
        ));
    }

    if !AccountService::new(state.store()).exists(&target).await? {
        return Err(AppError::NotFound(format!("user '{target}' not found")));
    }

    Ok(target)
}

/// An uploaded file.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Take the `file` field from a multipart body.
///
/// # Errors
///
/// Returns `BadRequest` if the body is malformed or has no `file` field.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        AppError::BadRequest(format!("invalid upload: {}", e.body_text()))
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await.map_err(malformed)?;
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::BadRequest("no file was uploaded".to_string()))
}

/// Run OCR for `user`, refusing to start a second run for the same user.
///
/// # Errors
///
/// Returns `Conflict` if a recognition for `user` is already running and
/// `Recognition` if the recognizer fails.
pub async fn recognize_for(
    state: &AppState,
    user: &Username,
    image: &[u8],
) -> Result<String, AppError> {
    let _slot = state.recognitions().try_begin(user).ok_or_else(|| {
        ServiceError::Conflict("an image is already being recognized, please wait".to_string())
    })?;

    let text = state
        .recognizer()
        .recognize(image)
        .await
        .map_err(ServiceError::from)?;
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        #[derive(Serialize)]
        struct Body {
            added: usize,
        }

        let json = serde_json::to_value(Success::new(Body { added: 2 })).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "added": 2 }));

        let json = serde_json::to_value(Success::empty()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }
}
