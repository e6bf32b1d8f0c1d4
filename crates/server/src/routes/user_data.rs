//! Raw call-data documents per user.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use phone_dialer_core::UserCallData;

use super::{Success, authorize_target};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::DialerService;
use crate::state::AppState;

/// Build the user-data router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/userData/{username}",
        get(get_user_data).put(put_user_data),
    )
}

/// GET /api/userData/{username}
async fn get_user_data(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserCallData>> {
    let target = authorize_target(&state, &user, &username).await?;
    let data = DialerService::new(state.store()).call_data(&target).await?;
    Ok(Json(data))
}

/// PUT /api/userData/{username}
async fn put_user_data(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(data): Json<UserCallData>,
) -> Result<Success<()>> {
    let target = authorize_target(&state, &user, &username).await?;
    DialerService::new(state.store())
        .put_call_data(&target, data)
        .await?;
    Ok(Success::empty())
}
