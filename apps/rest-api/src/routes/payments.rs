//! Payment routes: balances, cash/check allocation, card charges
//! through the processor, bill settlement, history, and receipts.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use pressline_core::payment::{allocate, tender_cash};
use pressline_core::validation::validate_amount_cents;
use pressline_core::{Money, Payment, PaymentMethod, Ticket};
use pressline_db::repository::payment::NewPayment;

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Permission required to run card charges.
pub const PROCESS_PAYMENTS: &str = "Process Payments";

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub customer_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct MakePaymentRequest {
    pub customer_id: i64,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    /// Required for cash payments.
    pub tendered_cents: Option<i64>,
    #[serde(default)]
    pub mark_picked_up: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    pub customer_id: i64,
    /// Specific tickets to settle; all outstanding when omitted.
    pub ticket_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub mark_picked_up: bool,
}

#[derive(Debug, Deserialize)]
pub struct PayBillRequest {
    pub customer_id: i64,
    pub ticket_id: i64,
    #[serde(default = "default_bill_method")]
    pub method: PaymentMethod,
}

fn default_bill_method() -> PaymentMethod {
    PaymentMethod::Other
}

/// GET /api/balance?customer_id=
pub async fn balance(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Value>> {
    let outstanding = state
        .db
        .tickets()
        .outstanding_balance(query.customer_id)
        .await?;
    Ok(Json(json!({ "outstanding_balance_cents": outstanding })))
}

/// POST /api/payments
///
/// Applies a cash/check payment against the customer's unpaid tickets
/// in creation order. Card payments go through `/api/charge`.
pub async fn make_payment(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<MakePaymentRequest>,
) -> ApiResult<Json<Value>> {
    validate_amount_cents(body.amount_cents)?;

    if body.method == PaymentMethod::Card {
        return Err(ApiError::BadRequest(
            "Card payments must use /api/charge".to_string(),
        ));
    }

    let amount = Money::from_cents(body.amount_cents);

    // Cash must cover the amount being applied; change is returned
    let cash = match body.method {
        PaymentMethod::Cash => {
            let tendered = body.tendered_cents.ok_or_else(|| {
                ApiError::BadRequest("'tendered_cents' is required for cash".to_string())
            })?;
            Some(tender_cash(amount, Money::from_cents(tendered))?)
        }
        _ => None,
    };

    let outstanding = state
        .db
        .tickets()
        .outstanding_for_customer(body.customer_id)
        .await?;
    if outstanding.is_empty() {
        return Err(ApiError::BadRequest(
            "Customer has no outstanding tickets".to_string(),
        ));
    }

    let outcome = allocate(amount, &outstanding)?;
    state
        .db
        .tickets()
        .apply_allocations(&outcome.allocations)
        .await?;

    let applied_cents = body.amount_cents - outcome.remainder_cents;
    let single_ticket = match outcome.allocations.as_slice() {
        [only] => Some(only.ticket_id),
        _ => None,
    };

    let payment = state
        .db
        .payments()
        .record(&NewPayment {
            customer_id: body.customer_id,
            ticket_id: single_ticket,
            method: body.method,
            amount_cents: applied_cents,
            tendered_cents: cash.map(|c| c.tendered_cents),
            change_cents: cash.map(|c| c.change_cents),
            processor_charge_id: None,
        })
        .await?;

    if body.mark_picked_up {
        let ticket_ids: Vec<i64> = outcome.allocations.iter().map(|a| a.ticket_id).collect();
        state.db.tickets().mark_picked_up(&ticket_ids).await?;
    }

    info!(
        payment_id = payment.id,
        applied_cents, "Payment recorded"
    );

    Ok(Json(json!({
        "message": "Payment successful",
        "payment_id": payment.id,
        "applied_cents": applied_cents,
        "remainder_cents": outcome.remainder_cents,
        "change_cents": cash.map(|c| c.change_cents),
        "allocations": outcome.allocations,
    })))
}

/// POST /api/charge
///
/// Card flow: fetch-or-create the processor customer, charge the
/// default saved payment method, then settle the selected tickets.
///
/// The remote charge and the local write are not atomic. When the
/// charge succeeds but the local write fails, the charge id is logged
/// at error level for manual reconciliation.
pub async fn charge(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<ChargeRequest>,
) -> ApiResult<Json<Value>> {
    let employee_id = claims.employee_id()?;
    if !state
        .db
        .employees()
        .has_permission(employee_id, PROCESS_PAYMENTS)
        .await?
    {
        return Err(ApiError::Forbidden(format!(
            "{PROCESS_PAYMENTS} permission required"
        )));
    }

    let customer = state
        .db
        .customers()
        .get_by_id(body.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer".to_string()))?;

    let mut outstanding = state
        .db
        .tickets()
        .outstanding_for_customer(body.customer_id)
        .await?;
    if let Some(ticket_ids) = &body.ticket_ids {
        outstanding.retain(|t| ticket_ids.contains(&t.ticket_id));
    }

    let due: i64 = outstanding.iter().map(|t| t.balance().cents()).sum();
    if due <= 0 {
        return Err(ApiError::BadRequest(
            "Nothing to charge for the selected tickets".to_string(),
        ));
    }

    // Fetch-or-create the processor customer, persisting a fresh id
    let processor_customer_id = state
        .processor
        .ensure_customer(
            customer.processor_customer_id.as_deref(),
            &customer.full_name(),
            customer.email.as_deref(),
        )
        .await?;
    if customer.processor_customer_id.is_none() {
        state
            .db
            .customers()
            .set_processor_customer_id(customer.id, &processor_customer_id)
            .await?;
    }

    let Some(payment_method) = state
        .processor
        .default_payment_method(&processor_customer_id)
        .await?
    else {
        let setup_url = state
            .processor
            .create_setup_link(&processor_customer_id)
            .await?;
        return Err(ApiError::BadRequest(format!(
            "Customer has no saved card; add one at {setup_url}"
        )));
    };

    let charge = state
        .processor
        .create_charge(
            &processor_customer_id,
            &payment_method.id,
            due,
            customer.email.as_deref(),
        )
        .await?;

    // Past this point the money has moved: local failures must not be
    // silently swallowed.
    let outcome = allocate(Money::from_cents(due), &outstanding)
        .map_err(|e| reconciliation_error(&charge.id, e.to_string()))?;
    state
        .db
        .tickets()
        .apply_allocations(&outcome.allocations)
        .await
        .map_err(|e| reconciliation_error(&charge.id, e.to_string()))?;

    let payment = state
        .db
        .payments()
        .record(&NewPayment {
            customer_id: body.customer_id,
            ticket_id: None,
            method: PaymentMethod::Card,
            amount_cents: due,
            tendered_cents: None,
            change_cents: None,
            processor_charge_id: Some(charge.id.clone()),
        })
        .await
        .map_err(|e| reconciliation_error(&charge.id, e.to_string()))?;

    if body.mark_picked_up {
        let ticket_ids: Vec<i64> = outcome.allocations.iter().map(|a| a.ticket_id).collect();
        state.db.tickets().mark_picked_up(&ticket_ids).await?;
    }

    info!(
        payment_id = payment.id,
        charge_id = %charge.id,
        amount_cents = due,
        "Card payment processed"
    );

    Ok(Json(json!({
        "message": "Payment successful",
        "payment_id": payment.id,
        "charge_id": charge.id,
        "amount_cents": due,
    })))
}

/// A local failure after a successful external charge: loud log, 500.
fn reconciliation_error(charge_id: &str, detail: String) -> ApiError {
    error!(
        charge_id,
        detail, "Charge succeeded externally but local update failed; manual reconciliation needed"
    );
    ApiError::Internal(format!(
        "charge {charge_id} succeeded but local update failed: {detail}"
    ))
}

/// POST /api/bills — settle one ticket in full.
pub async fn pay_bill(
    State(state): State<AppState>,
    _claims: Claims,
    Json(body): Json<PayBillRequest>,
) -> ApiResult<Json<Value>> {
    let ticket = state
        .db
        .tickets()
        .get_by_id(body.ticket_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket".to_string()))?;

    let balance = ticket.balance().cents();
    state
        .db
        .tickets()
        .pay_in_full(body.ticket_id, body.customer_id)
        .await?;

    state
        .db
        .payments()
        .record(&NewPayment {
            customer_id: body.customer_id,
            ticket_id: Some(body.ticket_id),
            method: body.method,
            amount_cents: balance,
            tendered_cents: None,
            change_cents: None,
            processor_charge_id: None,
        })
        .await?;

    Ok(Json(json!({ "message": "Bill paid successfully" })))
}

/// GET /api/billing-statements?customer_id=
pub async fn billing_statements(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Vec<Ticket>>> {
    Ok(Json(
        state
            .db
            .tickets()
            .billing_statements(query.customer_id)
            .await?,
    ))
}

/// GET /api/payments?customer_id=
pub async fn history(
    State(state): State<AppState>,
    _claims: Claims,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.db.payments().history(query.customer_id).await?))
}

/// GET /api/receipts/{id}?customer_id=
pub async fn receipt(
    State(state): State<AppState>,
    _claims: Claims,
    Path(payment_id): Path<i64>,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Payment>> {
    let payment = state
        .db
        .payments()
        .receipt(payment_id, query.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Receipt".to_string()))?;
    Ok(Json(payment))
}
