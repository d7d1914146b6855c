use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_db::StoreError;
use serde::Serialize;

/// Error returned by every handler and extractor.
///
/// Domain failures arrive as [`CoreError`]; the remaining variants come
/// from the HTTP edge. All of them render as `{ "error", "code" }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Request body failed field-level validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Malformed body, query string or path.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Core(CoreError::Unauthorized(message.into()))
    }

    /// Status, machine-readable code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                describe_validation(errors),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                internal()
            }
        }
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::DuplicateIdentifier(msg) => {
            (StatusCode::CONFLICT, "DUPLICATE_IDENTIFIER", msg.clone())
        }
        CoreError::AlreadyResigned(name) => (
            StatusCode::CONFLICT,
            "ALREADY_RESIGNED",
            format!("Employee {name} has already resigned"),
        ),
        CoreError::CapacityExceeded { prefix } => (
            StatusCode::CONFLICT,
            "CAPACITY_EXCEEDED",
            format!("No more codes can be issued for prefix {prefix}"),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Domain operation failed");
            internal()
        }
    }
}

/// Internal details stay in the log, never in the response.
fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Core(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

/// Flatten field errors into `field: message; field: message`, sorted by field.
fn describe_validation(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{field}: {}", messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}
