//! Shared helpers for the HTTP integration tests.
//!
//! Every test gets a fresh seeded [`MemoryStore`] behind the production
//! router, so the full middleware stack is exercised without a database.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use backoffice_api::auth::jwt::JwtConfig;
use backoffice_api::auth::password::hash_password;
use backoffice_api::config::{HistoryLimits, ServerConfig, DEFAULT_CODE_RETRY_ATTEMPTS};
use backoffice_api::router::build_app_router;
use backoffice_api::state::AppState;
use backoffice_db::seed::{self, MANAGER_EMAIL, MANAGER_PASSWORD};
use backoffice_db::MemoryStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        history: HistoryLimits::default(),
        code_retry_attempts: DEFAULT_CODE_RETRY_ATTEMPTS,
    }
}

/// Argon2 is slow in debug builds; hash the seed password once per binary.
fn seed_password_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(MANAGER_PASSWORD).expect("hashing should succeed"))
}

/// A seeded store plus the router serving it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over a freshly seeded in-memory store.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(test_config()).await
}

pub async fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    seed::seed_memory(&store, seed_password_hash())
        .await
        .expect("seeding should succeed");
    let router = build_app_router(AppState::new(store.clone(), config));
    TestApp { router, store }
}

/// Log in as the seeded manager and return the access token.
pub async fn manager_token(app: Router) -> String {
    let body = serde_json::json!({ "email": MANAGER_EMAIL, "password": MANAGER_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    json["accessToken"]
        .as_str()
        .expect("login must return accessToken")
        .to_string()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Send a raw (possibly malformed) JSON body.
pub async fn post_raw_auth(app: Router, uri: &str, body: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
