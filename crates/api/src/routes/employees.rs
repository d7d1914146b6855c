//! Route definitions for the `/employees` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::employees;
use crate::state::AppState;

/// Routes mounted at `/employees`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete (deprecated, resigns)
/// POST   /{id}/resign     -> resign
/// GET    /{id}/services   -> service_records
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(employees::list).post(employees::create))
        .route(
            "/{id}",
            get(employees::get_by_id)
                .patch(employees::update)
                .delete(employees::delete),
        )
        .route("/{id}/resign", post(employees::resign))
        .route("/{id}/services", get(employees::service_records))
}
