//! Notification routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use pressline_core::Notification;

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_id: i64,
    /// 0 for unread, 1 for read; omitted for all.
    pub is_read: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub customer_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub customer_id: i64,
}

/// GET /api/notifications?customer_id=&is_read=
pub async fn list(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Notification>>> {
    let is_read = match query.is_read {
        Some(0) => Some(false),
        Some(1) => Some(true),
        Some(_) => {
            return Err(ApiError::BadRequest(
                "'is_read' must be 0 or 1".to_string(),
            ))
        }
        None => None,
    };

    Ok(Json(
        state
            .db
            .notifications()
            .list(query.customer_id, is_read)
            .await?,
    ))
}

/// POST /api/notifications
pub async fn create(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    if body.kind.trim().is_empty() || body.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "'type' and 'message' are required".to_string(),
        ));
    }

    let notification = state
        .db
        .notifications()
        .create(body.customer_id, &body.kind, &body.message)
        .await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

/// POST /api/notifications/read
pub async fn mark_read(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<MarkReadRequest>,
) -> ApiResult<Json<Value>> {
    let marked = state
        .db
        .notifications()
        .mark_all_read(body.customer_id)
        .await?;
    Ok(Json(json!({
        "message": "Notifications marked as read",
        "marked": marked,
    })))
}
