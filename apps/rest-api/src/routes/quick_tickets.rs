//! Quick ticket routes: create at the counter, list outstanding,
//! convert into detailed-ticket slots.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use pressline_core::QuickTicketItem;
use pressline_db::repository::quick_ticket::{NewQuickSlot, NewQuickTicket, QuickTicketWithItems};

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateQuickTicketRequest {
    pub customer_id: i64,
    pub all_notes: Option<String>,
    pub slots: Vec<NewQuickSlot>,
}

#[derive(Debug, Deserialize)]
pub struct OutstandingQuery {
    pub customer_id: i64,
}

/// POST /api/quick-tickets
pub async fn create(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<CreateQuickTicketRequest>,
) -> ApiResult<(StatusCode, Json<QuickTicketWithItems>)> {
    let employee_id = claims.employee_id()?;

    if body.slots.is_empty() {
        return Err(ApiError::BadRequest(
            "Select at least one ticket type".to_string(),
        ));
    }

    state
        .db
        .customers()
        .get_by_id(body.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer".to_string()))?;

    for slot in &body.slots {
        state
            .db
            .catalog()
            .get_ticket_type(slot.ticket_type_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("TicketType".to_string()))?;
    }

    let created = state
        .db
        .quick_tickets()
        .create(&NewQuickTicket {
            customer_id: body.customer_id,
            employee_id,
            all_notes: body.all_notes,
            slots: body.slots,
        })
        .await?;

    info!(
        quick_ticket = created.quick_ticket.ticket_number,
        "Quick ticket created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/quick-tickets?customer_id=
pub async fn outstanding(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<OutstandingQuery>,
) -> ApiResult<Json<Vec<QuickTicketWithItems>>> {
    Ok(Json(
        state.db.quick_tickets().outstanding(query.customer_id).await?,
    ))
}

/// POST /api/quick-tickets/{id}/convert
///
/// Flips the converted flag (one-shot) and returns the slots, which
/// seed the detailed-ticket composition tabs.
pub async fn convert(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let items: Vec<QuickTicketItem> = state.db.quick_tickets().convert(id).await?;

    info!(quick_ticket_id = id, slots = items.len(), "Quick ticket converted");

    Ok(Json(json!({
        "message": "Quick ticket converted",
        "slots": items,
    })))
}
