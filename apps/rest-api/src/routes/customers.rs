//! Customer CRUD and search routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use pressline_core::validation::{validate_email, validate_name, validate_phone};
use pressline_core::Customer;
use pressline_db::repository::customer::{NewCustomer, UpdateCustomer};

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

fn validate_customer_fields(
    first_name: &str,
    last_name: &str,
    phone_number: &str,
    email: Option<&str>,
) -> ApiResult<()> {
    validate_name("first_name", first_name)?;
    validate_name("last_name", last_name)?;
    validate_phone(phone_number)?;
    if let Some(email) = email {
        validate_email(email)?;
    }
    Ok(())
}

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Customer>>> {
    let customers = state
        .db
        .customers()
        .list(query.limit.clamp(1, 200), query.offset.max(0))
        .await?;
    Ok(Json(customers))
}

/// GET /api/customers/search?q=
pub async fn search(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Customer>>> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("'q' is required".to_string()));
    }
    Ok(Json(state.db.customers().search(&query.q).await?))
}

/// GET /api/customers/{id}
pub async fn get(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .db
        .customers()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer".to_string()))?;
    Ok(Json(customer))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    validate_customer_fields(
        &body.first_name,
        &body.last_name,
        &body.phone_number,
        body.email.as_deref(),
    )?;

    let customer = state.db.customers().create(&body).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCustomer>,
) -> ApiResult<Json<Value>> {
    validate_customer_fields(
        &body.first_name,
        &body.last_name,
        &body.phone_number,
        body.email.as_deref(),
    )?;

    state.db.customers().update(id, &body).await?;

    // Account changes are surfaced to the customer
    state.db.notifications().notify_account_change(id).await?;

    Ok(Json(json!({ "message": "Customer updated successfully" })))
}

/// DELETE /api/customers/{id}
///
/// Deletion is allowed even with outstanding tickets; the response
/// carries the outstanding count so the operator sees what was dropped.
pub async fn remove(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let outstanding = state.db.customers().delete(id).await?;
    Ok(Json(json!({
        "message": "Customer deleted successfully",
        "outstanding_tickets": outstanding,
    })))
}
