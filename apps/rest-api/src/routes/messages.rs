//! Message routes between staff and customers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use pressline_core::Message;

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub recipient_id: i64,
    pub content: String,
}

/// GET /api/messages?customer_id=
pub async fn list(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.db.messages().list_for(query.customer_id).await?))
}

/// POST /api/messages
pub async fn send(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<SendRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequest("'content' is required".to_string()));
    }

    let sender_id = claims.employee_id()?;
    let message = state
        .db
        .messages()
        .send(sender_id, body.recipient_id, &body.content)
        .await?;

    // The recipient gets a notification alongside the message
    state
        .db
        .notifications()
        .notify_new_message(body.recipient_id)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}
