//! Delivery routes: pickup requests, status, saved addresses, and the
//! serviceable postal-code range. Status changes notify the customer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use pressline_core::{Delivery, DeliveryAddress, DeliveryStatus};
use pressline_db::repository::delivery::{NewDelivery, NewDeliveryAddress};

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub customer_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub customer_id: i64,
    pub delivery_id: i64,
    pub status: DeliveryStatus,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub postal_code: String,
}

/// POST /api/delivery/request
pub async fn request(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<NewDelivery>,
) -> ApiResult<(StatusCode, Json<Delivery>)> {
    if body.address.trim().is_empty() || body.pickup_date.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "'address' and 'pickup_date' are required".to_string(),
        ));
    }

    state
        .db
        .customers()
        .get_by_id(body.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer".to_string()))?;

    let delivery = state.db.deliveries().request(&body).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

/// GET /api/delivery/status?customer_id=
pub async fn status(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Value>> {
    match state.db.deliveries().latest(query.customer_id).await? {
        Some(delivery) => Ok(Json(serde_json::to_value(delivery).map_err(|e| {
            crate::error::ApiError::Internal(e.to_string())
        })?)),
        None => Ok(Json(json!({ "message": "No delivery status available" }))),
    }
}

/// PUT /api/delivery/status
pub async fn update_status(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Value>> {
    state
        .db
        .deliveries()
        .update_status(body.delivery_id, body.customer_id, body.status)
        .await?;

    state
        .db
        .notifications()
        .notify_delivery_status(body.customer_id, body.status)
        .await?;

    Ok(Json(json!({ "message": "Delivery status updated successfully" })))
}

/// DELETE /api/delivery/{id}?customer_id=
pub async fn cancel(
    State(state): State<AppState>,
    _claims: Claims,
    Path(delivery_id): Path<i64>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Value>> {
    state
        .db
        .deliveries()
        .cancel_pending(delivery_id, query.customer_id)
        .await?;

    Ok(Json(
        json!({ "message": "Delivery request cancelled successfully" }),
    ))
}

/// GET /api/delivery/addresses?customer_id=
pub async fn addresses(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Vec<DeliveryAddress>>> {
    Ok(Json(state.db.deliveries().addresses(query.customer_id).await?))
}

/// POST /api/delivery/addresses
pub async fn add_address(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<NewDeliveryAddress>,
) -> ApiResult<(StatusCode, Json<DeliveryAddress>)> {
    for (field, value) in [
        ("address", &body.address),
        ("city", &body.city),
        ("state", &body.state),
        ("postal_code", &body.postal_code),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("'{field}' is required")));
        }
    }

    let address = state.db.deliveries().add_address(&body).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// GET /api/delivery-range?postal_code=
pub async fn check_range(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Value>> {
    if query.postal_code.trim().is_empty() {
        return Err(ApiError::BadRequest("'postal_code' is required".to_string()));
    }

    let in_range = state.db.deliveries().in_range(&query.postal_code).await?;
    Ok(Json(json!({ "in_range": in_range })))
}
