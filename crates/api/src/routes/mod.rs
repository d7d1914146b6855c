pub mod auth;
pub mod branches;
pub mod employees;
pub mod health;
pub mod members;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/profile                        caller's account + employee
///
/// /branches                            list active branches
///
/// /members                             list, create
/// /members/{id}                        get, update, delete
/// /members/{id}/services               service history
///
/// /employees                           list, create
/// /employees/{id}                      get, update, delete (deprecated)
/// /employees/{id}/resign               resign (POST)
/// /employees/{id}/services             service history
/// ```
///
/// Everything except `/auth/login` requires a bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/branches", branches::router())
        .nest("/members", members::router())
        .nest("/employees", employees::router())
}
