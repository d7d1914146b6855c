//! `AppError` rendering. Calls `IntoResponse` directly; no router involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use backoffice_api::error::AppError;
use backoffice_core::code::CodeError;
use backoffice_core::error::CoreError;
use backoffice_db::StoreError;
use http_body_util::BodyExt;
use uuid::Uuid;
use validator::Validate;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn every_failure_maps_to_status_and_code() {
    let id = Uuid::nil();
    let cases: Vec<(AppError, StatusCode, &str, String)> = vec![
        (
            CoreError::NotFound { entity: "Member", id }.into(),
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Member with id {id} not found"),
        ),
        (
            CoreError::DuplicateIdentifier("Email a@example.com is already in use".into()).into(),
            StatusCode::CONFLICT,
            "DUPLICATE_IDENTIFIER",
            "Email a@example.com is already in use".into(),
        ),
        (
            CoreError::AlreadyResigned("王經理".into()).into(),
            StatusCode::CONFLICT,
            "ALREADY_RESIGNED",
            "Employee 王經理 has already resigned".into(),
        ),
        (
            CoreError::from(CodeError::CapacityExceeded { prefix: 'M' }).into(),
            StatusCode::CONFLICT,
            "CAPACITY_EXCEEDED",
            "No more codes can be issued for prefix M".into(),
        ),
        (
            CoreError::Conflict("code taken".into()).into(),
            StatusCode::CONFLICT,
            "CONFLICT",
            "code taken".into(),
        ),
        (
            AppError::unauthorized("Invalid or expired token"),
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Invalid or expired token".into(),
        ),
        (
            CoreError::Validation("Resignation reason must not be empty".into()).into(),
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Resignation reason must not be empty".into(),
        ),
        (
            AppError::BadRequest("Invalid branchId 'b1'".into()),
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Invalid branchId 'b1'".into(),
        ),
        (
            StoreError::MissingReference {
                entity: "Branch",
                reference: "b1".into(),
            }
            .into(),
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Branch b1 does not exist".into(),
        ),
    ];

    for (err, status, code, message) in cases {
        let label = format!("{err:?}");
        let (actual_status, json) = render(err).await;
        assert_eq!(actual_status, status, "{label}");
        assert_eq!(json["code"], code, "{label}");
        assert_eq!(json["error"], message, "{label}");
    }
}

#[tokio::test]
async fn internal_details_never_reach_the_client() {
    let leaks = [
        AppError::InternalError("password hash for manager@example.com".into()),
        StoreError::Corrupt("status 'zombie' in row 7".into()).into(),
        CoreError::Internal("connection refused to 10.0.0.5".into()).into(),
    ];
    for err in leaks {
        let (status, json) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }
}

#[tokio::test]
async fn code_collision_from_the_store_is_a_conflict() {
    let (status, json) = render(StoreError::Conflict("M000042".into()).into()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"].as_str().unwrap().contains("M000042"));
}

#[derive(Validate)]
struct Probe {
    #[validate(length(min = 1, message = "must not be empty"))]
    name: String,
    #[validate(email(message = "must be a valid email address"))]
    email: String,
}

#[tokio::test]
async fn field_errors_are_listed_by_field_name() {
    let probe = Probe {
        name: String::new(),
        email: "nope".into(),
    };
    let (status, json) = render(probe.validate().unwrap_err().into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"],
        "email: must be a valid email address; name: must not be empty"
    );
}
