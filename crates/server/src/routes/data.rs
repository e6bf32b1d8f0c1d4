//! Whole-store maintenance.

use axum::{Router, extract::State, routing::delete};

use super::Success;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the data router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/data/clear", delete(clear_data))
}

/// DELETE /api/data/clear
///
/// Removes every document. The seed accounts remain usable afterwards.
async fn clear_data(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Success<()>> {
    state.store().clear_all().await?;
    tracing::warn!(by = %admin.username, "All data cleared");
    Ok(Success::empty())
}
