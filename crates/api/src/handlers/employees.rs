//! Handlers for the `/employees` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::models::employee::{CreateEmployee, Employee, EmployeeDetail, UpdateEmployee};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::PageResult;
use backoffice_core::status::EmployeeStatus;
use backoffice_core::types::{DbId, Timestamp};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ValidatedJson;
use crate::query::ListQuery;
use crate::response::{MessageDataResponse, MessageResponse};
use crate::services::employee::{CredentialChange, Credentials};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /employees`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    pub branch_id: DbId,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

/// Request body for `PATCH /employees/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    pub branch_id: Option<DbId>,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
}

/// Request body for `POST /employees/{id}/resign`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResignRequest {
    #[validate(length(min = 1, max = 1000, message = "must be 1-1000 characters"))]
    pub resignation_reason: String,
    pub resignation_date: Option<DateInput>,
}

/// A full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    DateTime(Timestamp),
    Date(NaiveDate),
}

impl DateInput {
    pub fn to_timestamp(self) -> Timestamp {
        match self {
            DateInput::DateTime(ts) => ts,
            DateInput::Date(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::default())),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/employees
///
/// Creates the login account and the employee together.
pub async fn create(
    _user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let credentials = Credentials {
        email: input.email,
        password: input.password,
    };
    let employee = CreateEmployee {
        name: input.name,
        branch_id: input.branch_id,
        title: input.title,
        phone: input.phone,
        hire_date: input.hire_date,
    };
    let employee = state.employees.create(&credentials, &employee).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /api/v1/employees
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<PageResult<Employee>>> {
    let filter = params.employee_filter()?;
    let page = state.employees.list(&filter, params.page_request()).await?;
    Ok(Json(page))
}

/// GET /api/v1/employees/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<EmployeeDetail>> {
    Ok(Json(state.employees.get(id).await?))
}

/// PATCH /api/v1/employees/{id}
pub async fn update(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateEmployeeRequest>,
) -> AppResult<Json<Employee>> {
    let credentials = CredentialChange {
        email: input.email,
        password: input.password,
    };
    let patch = UpdateEmployee {
        name: input.name,
        branch_id: input.branch_id,
        title: input.title,
        phone: input.phone,
        hire_date: input.hire_date,
        status: input.status,
    };
    let employee = state.employees.update(id, &patch, &credentials).await?;
    Ok(Json(employee))
}

/// POST /api/v1/employees/{id}/resign
pub async fn resign(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<ResignRequest>,
) -> AppResult<Json<MessageDataResponse<Employee>>> {
    let date = input.resignation_date.map(DateInput::to_timestamp);
    let employee = state
        .employees
        .resign(id, &input.resignation_reason, date)
        .await?;
    Ok(Json(MessageDataResponse {
        message: format!(
            "Employee {} ({}) has resigned",
            employee.name, employee.employee_number
        ),
        data: employee,
    }))
}

/// DELETE /api/v1/employees/{id}
///
/// Deprecated: resigns the employee with a generic reason. Use
/// `POST /employees/{id}/resign` instead.
pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let employee = state.employees.remove(id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Employee {} ({}) has been marked as resigned",
        employee.name, employee.employee_number
    ))))
}

/// GET /api/v1/employees/{id}/services
pub async fn service_records(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<ServiceRecord>>> {
    Ok(Json(state.employees.service_records(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::status::MAX_RESIGNATION_REASON_LEN;

    #[test]
    fn resignation_date_accepts_date_or_timestamp() {
        let date: DateInput = serde_json::from_str("\"2024-01-31\"").unwrap();
        assert_eq!(
            date.to_timestamp().to_rfc3339(),
            "2024-01-31T00:00:00+00:00"
        );
        let ts: DateInput = serde_json::from_str("\"2024-01-31T09:30:00Z\"").unwrap();
        assert_eq!(ts.to_timestamp().to_rfc3339(), "2024-01-31T09:30:00+00:00");
    }

    #[test]
    fn resign_request_enforces_reason_bounds() {
        let empty = ResignRequest {
            resignation_reason: String::new(),
            resignation_date: None,
        };
        assert!(empty.validate().is_err());

        let long = ResignRequest {
            resignation_reason: "x".repeat(MAX_RESIGNATION_REASON_LEN + 1),
            resignation_date: None,
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn update_request_validates_only_present_fields() {
        assert!(UpdateEmployeeRequest::default().validate().is_ok());
        let bad = UpdateEmployeeRequest {
            password: Some("short".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
