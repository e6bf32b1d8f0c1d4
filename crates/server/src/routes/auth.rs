//! Login, logout and session lookup.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use phone_dialer_core::Role;

use super::Success;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::{AccountService, ServiceError};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(current_session))
}

/// Login form.
///
/// The role is taken as a plain string so an unknown role fails like any
/// other credential mismatch.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: CurrentUser,
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Success<LoginResponse>> {
    let role: Role = body
        .role
        .parse()
        .map_err(|_| ServiceError::InvalidCredentials)?;

    let user = AccountService::new(state.store())
        .authenticate(&body.username, &body.password, role)
        .await
        .inspect_err(|_| {
            tracing::warn!(username = %body.username, role = %body.role, "Login rejected");
        })?;

    set_current_user(&session, &user).await?;
    set_sentry_user(&user.username);
    tracing::info!(username = %user.username, role = %user.role, "User logged in");

    Ok(Success::new(LoginResponse { user }))
}

/// POST /api/auth/logout
async fn logout(OptionalAuth(user): OptionalAuth, session: Session) -> Result<Success<()>> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    if let Some(user) = user {
        tracing::info!(username = %user.username, "User logged out");
    }
    Ok(Success::empty())
}

/// GET /api/auth/session
///
/// The session user, or 401 with a `null` body.
async fn current_session(OptionalAuth(user): OptionalAuth) -> Response {
    match user {
        Some(user) => Json(user).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(serde_json::Value::Null)).into_response(),
    }
}
