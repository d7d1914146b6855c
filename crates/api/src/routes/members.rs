//! Route definitions for the `/members` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::members;
use crate::state::AppState;

/// Routes mounted at `/members`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/services   -> service_records
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(members::list).post(members::create))
        .route(
            "/{id}",
            get(members::get_by_id)
                .patch(members::update)
                .delete(members::delete),
        )
        .route("/{id}/services", get(members::service_records))
}
