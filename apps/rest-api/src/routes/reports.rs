//! CSV report exports: order history and billing history.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use pressline_core::Ticket;

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub customer_id: i64,
}

const CSV_HEADER: &str = "id,ticket_number,customer_id,ticket_type_id,employee_id,\
total_price_cents,payment_cents,picked_up,pieces,delivery_status,date_created,date_due\n";

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn tickets_to_csv(tickets: &[Ticket]) -> String {
    let mut out = String::from(CSV_HEADER);
    for t in tickets {
        let status = serde_json::to_value(t.delivery_status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}\n",
            t.id,
            t.ticket_number,
            t.customer_id,
            t.ticket_type_id,
            t.employee_id,
            t.total_price_cents,
            t.payment_cents,
            t.picked_up as u8,
            t.pieces,
            csv_escape(&status),
            t.date_created.to_rfc3339(),
            t.date_due.to_rfc3339(),
        ));
    }
    out
}

fn csv_response(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

/// GET /api/reports/orders?customer_id=
pub async fn orders(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<impl IntoResponse> {
    let tickets = state.db.tickets().list_for_customer(query.customer_id).await?;
    if tickets.is_empty() {
        return Err(ApiError::NotFound("Orders".to_string()));
    }

    Ok(csv_response("order_history.csv", tickets_to_csv(&tickets)))
}

/// GET /api/reports/bills?customer_id=
pub async fn bills(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<impl IntoResponse> {
    let tickets = state
        .db
        .tickets()
        .billing_statements(query.customer_id)
        .await?;
    if tickets.is_empty() {
        return Err(ApiError::NotFound("Billing history".to_string()));
    }

    Ok(csv_response("billing_history.csv", tickets_to_csv(&tickets)))
}
