//! Liveness probe for load balancers. Mounted at the root, outside
//! `/api/v1`, and open to anonymous callers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok`, or `degraded` while the store cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

impl HealthReport {
    fn new(store_reachable: bool) -> Self {
        Self {
            status: if store_reachable { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy: store_reachable,
        }
    }
}

/// Always answers 200; a broken store only flips `status`.
async fn report(State(state): State<AppState>) -> Json<HealthReport> {
    let reachable = state
        .store
        .health_check()
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Store unreachable"))
        .is_ok();
    Json(HealthReport::new(reachable))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(report))
}
