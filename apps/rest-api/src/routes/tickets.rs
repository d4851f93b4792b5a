//! Ticket routes: listing, detailed composition, header updates, and
//! delivery status.
//!
//! Composition is server-priced: the client names garment variants and
//! quantities, the server freezes unit prices from the catalog and
//! computes totals through the core crate before anything is stored.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use pressline_core::ticket::{LineModifiers, TicketDraft, TicketWorkspace};
use pressline_core::validation::normalize_quantity;
use pressline_core::{DeliveryStatus, Money, TaxRate, Ticket, TicketGarment};
use pressline_db::repository::ticket::{TicketFilter, TicketPage, UpdateTicket};

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Request/Response Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub garment_variant_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub color_ids: Vec<i64>,
    #[serde(default)]
    pub pattern_ids: Vec<i64>,
    #[serde(default)]
    pub texture_ids: Vec<i64>,
    #[serde(default)]
    pub upcharge_ids: Vec<i64>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub ticket_type_id: i64,
    #[serde(default)]
    pub pieces: i64,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
    #[serde(default)]
    pub deductions_cents: i64,
    /// When set, the configured delivery fee is added to this tab.
    #[serde(default)]
    pub delivery: bool,
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketsRequest {
    pub customer_id: i64,
    pub all_notes: Option<String>,
    pub tabs: Vec<TabRequest>,
}

#[derive(Debug, Deserialize)]
pub struct TicketListQuery {
    pub customer_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<DeliveryStatus>,
    #[serde(rename = "type")]
    pub ticket_type_id: Option<i64>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct LineDetail {
    #[serde(flatten)]
    pub line: TicketGarment,
    pub modifiers: LineModifiers,
}

#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub lines: Vec<LineDetail>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryStatusBody {
    pub delivery_status: DeliveryStatus,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/tickets
pub async fn list(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<TicketListQuery>,
) -> ApiResult<Json<TicketPage>> {
    let filter = TicketFilter {
        customer_id: query.customer_id,
        start_date: query.start_date,
        end_date: query.end_date,
        delivery_status: query.status,
        ticket_type_id: query.ticket_type_id,
    };

    let page = state
        .db
        .tickets()
        .list(&filter, query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

/// POST /api/tickets
///
/// Creates one ticket per composed tab (up to three, matching the
/// quick-ticket slots) in a single request.
pub async fn create(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<CreateTicketsRequest>,
) -> ApiResult<(StatusCode, Json<Vec<Ticket>>)> {
    let employee_id = claims.employee_id()?;

    state
        .db
        .customers()
        .get_by_id(body.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer".to_string()))?;

    let tax_rate = TaxRate::from_bps(state.config.tax_rate_bps);

    // Compose everything in memory first; nothing is written until
    // every tab passes the readiness check.
    let mut workspace = TicketWorkspace::new();
    let mut tab_meta = Vec::new();

    for tab in &body.tabs {
        state
            .db
            .catalog()
            .get_ticket_type(tab.ticket_type_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("TicketType".to_string()))?;

        let mut draft = TicketDraft::new(tab.ticket_type_id, tab.pieces, tab.due_date);
        draft.notes = tab.notes.clone();
        draft.deductions_cents = tab.deductions_cents.max(0);

        for line in &tab.lines {
            let variant = state
                .db
                .catalog()
                .get_variant(line.garment_variant_id)
                .await?
                .ok_or_else(|| {
                    ApiError::BadRequest(format!(
                        "Garment variant {} does not exist",
                        line.garment_variant_id
                    ))
                })?;

            let index = draft.add_line(
                variant.id,
                variant.name.clone(),
                variant.price(),
                normalize_quantity(line.quantity),
            )?;
            draft.attach_modifiers(
                index,
                LineModifiers {
                    color_ids: line.color_ids.clone(),
                    pattern_ids: line.pattern_ids.clone(),
                    texture_ids: line.texture_ids.clone(),
                    upcharge_ids: line.upcharge_ids.clone(),
                },
            )?;
        }

        let delivery_fee = if tab.delivery {
            Money::from_cents(state.config.delivery_fee_cents)
        } else {
            Money::zero()
        };

        tab_meta.push(delivery_fee);
        workspace.add_tab(draft)?;
    }

    workspace.ensure_ready()?;

    let mut created = Vec::with_capacity(workspace.len());
    for (draft, delivery_fee) in workspace.tabs().iter().zip(tab_meta) {
        let totals = draft.totals(tax_rate, delivery_fee);
        let ticket = state
            .db
            .tickets()
            .create_from_draft(
                body.customer_id,
                employee_id,
                draft,
                &totals,
                body.all_notes.as_deref(),
            )
            .await?;
        info!(
            ticket_number = ticket.ticket_number,
            total_cents = ticket.total_price_cents,
            "Ticket created"
        );
        created.push(ticket);
    }

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/tickets/{id}
pub async fn get(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
) -> ApiResult<Json<TicketDetail>> {
    let ticket = state
        .db
        .tickets()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket".to_string()))?;

    let mut lines = Vec::new();
    for line in state.db.tickets().lines(id).await? {
        let modifiers = state.db.tickets().line_modifiers(line.id).await?;
        lines.push(LineDetail { line, modifiers });
    }

    Ok(Json(TicketDetail { ticket, lines }))
}

/// PUT /api/tickets/{id}
pub async fn update(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTicket>,
) -> ApiResult<Json<Value>> {
    state.db.tickets().update(id, &body).await?;
    Ok(Json(json!({ "message": "Ticket updated successfully" })))
}

/// DELETE /api/tickets/{id}
pub async fn remove(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.db.tickets().delete(id).await?;
    Ok(Json(json!({ "message": "Ticket deleted successfully" })))
}

/// GET /api/tickets/{id}/delivery-status
pub async fn delivery_status(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let status = state
        .db
        .tickets()
        .delivery_status(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket".to_string()))?;

    Ok(Json(json!({ "ticket_id": id, "delivery_status": status })))
}

/// PATCH /api/tickets/{id}/delivery-status
pub async fn set_delivery_status(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i64>,
    Json(body): Json<DeliveryStatusBody>,
) -> ApiResult<Json<Value>> {
    let ticket = state
        .db
        .tickets()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket".to_string()))?;

    state
        .db
        .tickets()
        .set_delivery_status(id, body.delivery_status)
        .await?;

    state
        .db
        .notifications()
        .notify_delivery_status(ticket.customer_id, body.delivery_status)
        .await?;

    Ok(Json(json!({ "message": "Delivery status updated successfully" })))
}
