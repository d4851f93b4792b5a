//! # Payment Rules
//!
//! Pure payment math: allocating an amount across outstanding tickets
//! and the cash tender/change rules.
//!
//! ## Allocation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A $12.00 payment against two unpaid tickets:                           │
//! │                                                                         │
//! │    Ticket #101  total $10.00  paid $0.00   ──► receives $10.00 (paid)  │
//! │    Ticket #102  total $15.00  paid $0.00   ──► receives  $2.00         │
//! │                                                                         │
//! │  Tickets are walked in creation order. No ticket is ever paid above    │
//! │  its total. Whatever cannot be applied is returned as the remainder.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Allocation
// =============================================================================

/// An outstanding ticket balance, as loaded from the database in
/// creation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutstandingTicket {
    pub ticket_id: i64,
    pub total_price_cents: i64,
    pub payment_cents: i64,
}

impl OutstandingTicket {
    /// Remaining balance, floored at zero.
    pub fn balance(&self) -> Money {
        Money::from_cents(self.total_price_cents)
            .saturating_sub_zero(Money::from_cents(self.payment_cents))
    }
}

/// The slice of a payment applied to one ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub ticket_id: i64,
    pub applied_cents: i64,
    /// The ticket's payment column after this allocation.
    pub new_payment_cents: i64,
    /// True when this allocation settles the ticket in full.
    pub paid_in_full: bool,
}

/// Result of allocating a payment amount across tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub allocations: Vec<Allocation>,
    /// Amount left over after every ticket is settled.
    pub remainder_cents: i64,
}

/// Applies `amount` against `outstanding` tickets in the given order
/// (callers load them in creation order), paying each up to its
/// remaining balance until the amount runs out.
///
/// Tickets already settled contribute no allocation. The amount must be
/// positive.
pub fn allocate(amount: Money, outstanding: &[OutstandingTicket]) -> CoreResult<AllocationOutcome> {
    if !amount.is_positive() {
        return Err(CoreError::InvalidPaymentAmount {
            reason: format!("amount must be positive, got {} cents", amount.cents()),
        });
    }

    let mut remaining = amount;
    let mut allocations = Vec::new();

    for ticket in outstanding {
        if remaining.is_zero() {
            break;
        }

        let balance = ticket.balance();
        if balance.is_zero() {
            continue;
        }

        let applied = remaining.min(balance);
        remaining -= applied;

        let new_payment = Money::from_cents(ticket.payment_cents) + applied;
        allocations.push(Allocation {
            ticket_id: ticket.ticket_id,
            applied_cents: applied.cents(),
            new_payment_cents: new_payment.cents(),
            paid_in_full: new_payment.cents() >= ticket.total_price_cents,
        });
    }

    Ok(AllocationOutcome {
        allocations,
        remainder_cents: remaining.cents(),
    })
}

// =============================================================================
// Cash Tender
// =============================================================================

/// Cash tender outcome: what was due, handed over, and returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTender {
    pub due_cents: i64,
    pub tendered_cents: i64,
    pub change_cents: i64,
}

/// Validates a cash tender against the amount due.
///
/// The tender must cover the total; change is `tendered − due`, floored
/// at zero.
pub fn tender_cash(due: Money, tendered: Money) -> CoreResult<CashTender> {
    if tendered < due {
        return Err(CoreError::InsufficientTender {
            tendered_cents: tendered.cents(),
            due_cents: due.cents(),
        });
    }

    Ok(CashTender {
        due_cents: due.cents(),
        tendered_cents: tendered.cents(),
        change_cents: tendered.saturating_sub_zero(due).cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
