//! Auth and account routes: register, login, token refresh, account
//! CRUD. Employee deletion is permission-gated.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use pressline_core::validation::{validate_name, validate_password};
use pressline_db::repository::employee::{NewEmployee, UpdateEmployee};

use crate::auth::{self, Claims};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Permission required to manage other employees' accounts.
pub const MANAGE_EMPLOYEES: &str = "Manage Employees";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub employee_name: String,
    pub password: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub employee_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub employee_name: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    /// When present, replaces the password.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteEmployeeRequest {
    pub employee_id: i64,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_name("employee_name", &body.employee_name)?;
    validate_name("display_name", &body.display_name)?;
    validate_password(&body.password)?;

    let employee_name = body.employee_name.trim().to_lowercase();
    let password_hash = auth::hash_password(&body.password)?;

    let employee = state
        .db
        .employees()
        .create(&NewEmployee {
            employee_name,
            password_hash,
            display_name: body.display_name.trim().to_string(),
            phone_number: body.phone_number,
            email: body.email,
        })
        .await?;

    info!(employee_id = employee.id, "Employee registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Employee registered successfully", "id": employee.id })),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let employee = state
        .db
        .employees()
        .get_by_name(&body.employee_name)
        .await?
        .ok_or_else(|| ApiError::AuthFailed("Invalid credentials".to_string()))?;

    if !auth::verify_password(&body.password, &employee.password_hash) {
        return Err(ApiError::AuthFailed("Invalid credentials".to_string()));
    }

    info!(employee_id = employee.id, "Employee logged in");

    Ok(Json(TokenResponse {
        access_token: state
            .jwt
            .generate_access_token(employee.id, &employee.display_name)?,
        refresh_token: state
            .jwt
            .generate_refresh_token(employee.id, &employee.display_name)?,
        expires_in: state.jwt.access_lifetime_secs(),
        token_type: "Bearer",
    }))
}

/// POST /api/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let claims = state.jwt.validate_refresh_token(&body.refresh_token)?;
    let employee_id = claims.employee_id()?;

    Ok(Json(TokenResponse {
        access_token: state
            .jwt
            .generate_access_token(employee_id, &claims.display_name)?,
        refresh_token: state
            .jwt
            .generate_refresh_token(employee_id, &claims.display_name)?,
        expires_in: state.jwt.access_lifetime_secs(),
        token_type: "Bearer",
    }))
}

/// GET /api/account
pub async fn get_account(
    State(state): State<AppState>,
    claims: Claims,
) -> ApiResult<Json<pressline_core::Employee>> {
    let employee_id = claims.employee_id()?;
    let employee = state
        .db
        .employees()
        .get_by_id(employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account".to_string()))?;

    Ok(Json(employee))
}

/// PUT /api/account
pub async fn update_account(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<UpdateAccountRequest>,
) -> ApiResult<Json<Value>> {
    let employee_id = claims.employee_id()?;

    validate_name("employee_name", &body.employee_name)?;
    validate_name("display_name", &body.display_name)?;

    let password_hash = match &body.password {
        Some(password) if !password.is_empty() => {
            validate_password(password)?;
            Some(auth::hash_password(password)?)
        }
        _ => None,
    };

    state
        .db
        .employees()
        .update(
            employee_id,
            &UpdateEmployee {
                employee_name: body.employee_name.trim().to_lowercase(),
                display_name: body.display_name.trim().to_string(),
                phone_number: body.phone_number,
                email: body.email,
                password_hash,
            },
        )
        .await?;

    Ok(Json(json!({ "message": "Account updated successfully" })))
}

/// DELETE /api/account
///
/// Deletes another employee's account. Requires the Manage Employees
/// permission; self-deletion is rejected.
pub async fn delete_employee(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<DeleteEmployeeRequest>,
) -> ApiResult<Json<Value>> {
    let caller_id = claims.employee_id()?;

    if caller_id == body.employee_id {
        return Err(ApiError::Forbidden(
            "You cannot delete your own account".to_string(),
        ));
    }

    if !state
        .db
        .employees()
        .has_permission(caller_id, MANAGE_EMPLOYEES)
        .await?
    {
        return Err(ApiError::Forbidden(format!(
            "{MANAGE_EMPLOYEES} permission required"
        )));
    }

    state.db.employees().delete(body.employee_id).await?;
    info!(
        deleted_by = caller_id,
        employee_id = body.employee_id,
        "Employee deleted"
    );

    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}
