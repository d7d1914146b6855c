//! Handlers for the `/branches` resource.

use axum::extract::State;
use axum::Json;
use backoffice_core::models::branch::Branch;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/branches
///
/// Active branches ordered by name.
pub async fn list(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Branch>>> {
    let branches = state.store.list_active_branches().await?;
    Ok(Json(branches))
}
