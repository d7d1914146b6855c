//! Handlers for the `/auth` resource (login, profile).

use axum::extract::State;
use axum::Json;
use backoffice_core::models::account::AccountSummary;
use backoffice_core::models::employee::Employee;
use backoffice_core::status::AccountStatus;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ValidatedJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// The caller's account and, if the account belongs to one, employee.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: AccountSummary,
    pub employee: Option<Employee>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Exchange email + password for a bearer access token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid = || AppError::unauthorized("Invalid email or password");

    // 1. Find the account by email.
    let account = state
        .store
        .find_account_by_email(&input.email)
        .await?
        .ok_or_else(invalid)?;

    // 2. Verify the password.
    let password_valid = verify_password(&input.password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = %account.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    // 3. Only active accounts may log in.
    if account.status != AccountStatus::Active {
        tracing::info!(user_id = %account.id, status = %account.status, "Login rejected: account not active");
        return Err(AppError::unauthorized(format!("Account is {}", account.status)));
    }

    // 4. Record the login and issue the token.
    state.store.record_login(account.id).await?;
    let issued = state
        .config
        .jwt
        .issue(account.id, &account.email)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = %account.id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}

/// GET /api/v1/auth/profile
pub async fn profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let account = state
        .store
        .find_account(user.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;
    let employee = state.store.find_employee_by_user(account.id).await?;

    Ok(Json(ProfileResponse {
        user: AccountSummary::from(&account),
        employee,
    }))
}
