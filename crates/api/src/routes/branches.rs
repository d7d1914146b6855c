//! Route definitions for the `/branches` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::branches;
use crate::state::AppState;

/// Routes mounted at `/branches`.
///
/// ```text
/// GET /  -> list
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(branches::list))
}
