//! Saved-card routes. Cards store a processor token plus masked
//! display metadata; the default-card invariant is enforced by the
//! repository.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use pressline_core::CreditCard;
use pressline_db::repository::card::NewCard;

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub customer_id: i64,
}

/// GET /api/credit-cards?customer_id=
pub async fn list(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Vec<CreditCard>>> {
    Ok(Json(state.db.cards().list(query.customer_id).await?))
}

/// POST /api/credit-cards
pub async fn add(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<NewCard>,
) -> ApiResult<(StatusCode, Json<CreditCard>)> {
    if body.processor_token.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "'processor_token' is required".to_string(),
        ));
    }
    if body.card_last_4.len() != 4 || !body.card_last_4.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::BadRequest(
            "'card_last_4' must be four digits".to_string(),
        ));
    }
    if !(1..=12).contains(&body.exp_month) {
        return Err(ApiError::BadRequest(
            "'exp_month' must be between 1 and 12".to_string(),
        ));
    }

    state
        .db
        .customers()
        .get_by_id(body.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer".to_string()))?;

    let card = state.db.cards().add(&body).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// DELETE /api/credit-cards/{id}?customer_id=
pub async fn remove(
    State(state): State<AppState>,
    _claims: Claims,
    Path(card_id): Path<i64>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Value>> {
    state.db.cards().delete(card_id, query.customer_id).await?;
    Ok(Json(json!({ "message": "Credit card deleted successfully" })))
}

/// POST /api/credit-cards/{id}/set-default?customer_id=
pub async fn set_default(
    State(state): State<AppState>,
    _claims: Claims,
    Path(card_id): Path<i64>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Value>> {
    state
        .db
        .cards()
        .set_default(card_id, query.customer_id)
        .await?;
    Ok(Json(
        json!({ "message": "Default credit card updated successfully" }),
    ))
}
