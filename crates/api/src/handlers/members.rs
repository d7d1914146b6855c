//! Handlers for the `/members` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::models::member::{CreateMember, Member, MemberDetail, UpdateMember};
use backoffice_core::models::service_record::ServiceRecord;
use backoffice_core::pagination::PageResult;
use backoffice_core::status::{Gender, MemberStatus};
use backoffice_core::types::DbId;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ValidatedJson;
use crate::query::ListQuery;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /members`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub home_branch_id: DbId,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl From<CreateMemberRequest> for CreateMember {
    fn from(req: CreateMemberRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            email: req.email,
            home_branch_id: req.home_branch_id,
            birth_date: req.birth_date,
            gender: req.gender,
        }
    }
}

/// Request body for `PATCH /members/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub home_branch_id: Option<DbId>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub status: Option<MemberStatus>,
}

impl From<UpdateMemberRequest> for UpdateMember {
    fn from(req: UpdateMemberRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            email: req.email,
            home_branch_id: req.home_branch_id,
            birth_date: req.birth_date,
            gender: req.gender,
            status: req.status,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/members
pub async fn create(
    _user: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateMemberRequest>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let member = state.members.create(&input.into()).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /api/v1/members
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<PageResult<Member>>> {
    let filter = params.member_filter()?;
    let page = state.members.list(&filter, params.page_request()).await?;
    Ok(Json(page))
}

/// GET /api/v1/members/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MemberDetail>> {
    Ok(Json(state.members.get(id).await?))
}

/// PATCH /api/v1/members/{id}
pub async fn update(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateMemberRequest>,
) -> AppResult<Json<Member>> {
    let member = state.members.update(id, &input.into()).await?;
    Ok(Json(member))
}

/// DELETE /api/v1/members/{id}
///
/// Hard delete; the member's service records go with it.
pub async fn delete(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let member_number = state.members.remove(id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Member {member_number} deleted"
    ))))
}

/// GET /api/v1/members/{id}/services
pub async fn service_records(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<ServiceRecord>>> {
    Ok(Json(state.members.service_records(id).await?))
}
