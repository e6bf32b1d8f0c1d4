//! Account management handlers.
//!
//! The user table carries plaintext passwords, so reading it is admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde::Serialize;

use phone_dialer_core::{UserTable, Username};

use super::Success;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::services::{AccountService, NewAccount};
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(list_users).put(replace_users).post(create_user),
        )
        .route("/api/users/{username}", delete(delete_user))
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub username: Username,
}

/// GET /api/users
async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<UserTable>> {
    let users = AccountService::new(state.store()).list().await?;
    Ok(Json(users))
}

/// PUT /api/users
async fn replace_users(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(users): Json<UserTable>,
) -> Result<Success<()>> {
    AccountService::new(state.store()).replace(users).await?;
    tracing::info!(by = %admin.username, "User table replaced");
    Ok(Success::empty())
}

/// POST /api/users
async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(account): Json<NewAccount>,
) -> Result<impl IntoResponse> {
    let username = AccountService::new(state.store()).create(account).await?;
    Ok((StatusCode::CREATED, Success::new(CreatedUser { username })))
}

/// DELETE /api/users/{username}
///
/// Only admins may delete accounts, and the built-in admin is never deleted.
async fn delete_user(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Success<()>> {
    let target = Username::parse(&username).map_err(|e| AppError::BadRequest(e.to_string()))?;

    // The admin account gets the same refusal whoever asks.
    if !user.is_admin() && !target.is_builtin_admin() {
        return Err(AppError::Forbidden(
            "only administrators can delete accounts".to_string(),
        ));
    }

    AccountService::new(state.store()).delete(&target).await?;
    Ok(Success::empty())
}
