//! # Domain Types
//!
//! Core domain types used throughout Pressline POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Ticket      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  ticket_number  │   │  method         │       │
//! │  │  name, phone    │   │  total_price    │   │  amount_cents   │       │
//! │  │  processor id   │   │  payment_cents  │   │  charge id      │       │
//! │  └─────────────────┘   │  picked_up      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  Catalog: Garment ──► GarmentVariant (the priced unit)                 │
//! │  Modifiers: Color, Pattern, Texture, Upcharge (attach to line items)   │
//! │  Offerings: TicketType decides which of the above are available        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity uses its SQLite rowid (`i64`) as the primary key. Tickets
//! and quick tickets additionally carry a human-facing `ticket_number`,
//! allocated sequentially, which is what gets printed on the physical tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// People
// =============================================================================

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub notes: Option<String>,
    /// External payment-processor customer id, set lazily on first charge.
    pub processor_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Full display name, "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An employee (cashier/manager) account.
///
/// The password hash never leaves the server: it is skipped during
/// serialization so account endpoints cannot leak it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub employee_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A named role (manager, clerk, custom).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// A named permission ("Manage Employees", "Process Payments", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Pricing Catalog
// =============================================================================

/// A garment category ("Shirt", "Pants").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Garment {
    pub id: i64,
    pub name: String,
}

/// A priced garment variant ("Shirt / Long Sleeve"). Variants, not
/// garments, are what gets added to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GarmentVariant {
    pub id: i64,
    pub garment_id: i64,
    pub name: String,
    pub price_cents: i64,
}

impl GarmentVariant {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Color {
    pub id: i64,
    pub name: String,
    /// Hex value for swatch rendering.
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Pattern {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Texture {
    pub id: i64,
    pub name: String,
}

/// An upcharge option ("Heavy starch").
///
/// The price is catalog data only: attaching an upcharge to a line item
/// records it on the ticket without changing the ticket total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Upcharge {
    pub id: i64,
    pub description: String,
    pub price_cents: i64,
}

/// A discount: either a percentage (basis points) or a flat amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Discount {
    pub id: i64,
    pub name: String,
    pub percent_bps: Option<i64>,
    pub amount_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A service category ("Dry Clean", "Wash & Fold") deciding which
/// garments and modifiers are offered during composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TicketType {
    pub id: i64,
    pub name: String,
}

/// The modifier catalog a ticket type offers, resolved in one shot for
/// the composition screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferedModifiers {
    pub colors: Vec<Color>,
    pub patterns: Vec<Pattern>,
    pub textures: Vec<Texture>,
    pub upcharges: Vec<Upcharge>,
}

// =============================================================================
// Tickets
// =============================================================================

/// Delivery lifecycle of a ticket or delivery request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl Default for DeliveryStatus {
    fn default() -> Self {
        DeliveryStatus::Pending
    }
}

/// A detailed ticket: one customer, one service type, priced line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ticket {
    pub id: i64,
    pub customer_id: i64,
    pub ticket_type_id: i64,
    pub employee_id: i64,
    pub ticket_number: i64,
    pub total_price_cents: i64,
    /// Amount paid so far; never exceeds `total_price_cents`.
    pub payment_cents: i64,
    pub picked_up: bool,
    pub pieces: i64,
    pub notes: Option<String>,
    pub all_notes: Option<String>,
    pub delivery_status: DeliveryStatus,
    pub date_created: DateTime<Utc>,
    pub date_due: DateTime<Utc>,
}

impl Ticket {
    /// Returns the total price as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    /// Returns the amount paid as Money.
    #[inline]
    pub fn payment(&self) -> Money {
        Money::from_cents(self.payment_cents)
    }

    /// Remaining balance, floored at zero.
    #[inline]
    pub fn balance(&self) -> Money {
        self.total_price().saturating_sub_zero(self.payment())
    }

    /// A ticket is paid once the payment covers the total.
    #[inline]
    pub fn is_paid(&self) -> bool {
        self.payment_cents >= self.total_price_cents
    }
}

/// A ticket line item: a garment variant at a frozen unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TicketGarment {
    pub id: i64,
    pub ticket_id: i64,
    pub garment_variant_id: i64,
    pub quantity: i64,
    /// Unit price in cents at the time the line was added.
    pub price_cents: i64,
}

impl TicketGarment {
    /// Line total before tax (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Quick Tickets
// =============================================================================

/// A quick ticket: the paper-tag stub taken at the counter, holding up
/// to three service groups to be priced out later as detailed tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuickTicket {
    pub id: i64,
    pub ticket_number: i64,
    pub customer_id: i64,
    pub employee_id: i64,
    /// Transitions 0→1 exactly once; converted tickets leave the
    /// outstanding listing.
    pub converted: bool,
    pub all_notes: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// One slot of a quick ticket (slot 1..=3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuickTicketItem {
    pub quick_ticket_id: i64,
    pub slot: i64,
    pub ticket_type_id: i64,
    pub pieces: i64,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

// =============================================================================
// Payments
// =============================================================================

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash; requires tendered >= total.
    Cash,
    Check,
    /// Charged through the external processor.
    Card,
    Other,
}

/// A recorded payment against a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub customer_id: i64,
    pub ticket_id: Option<i64>,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    /// For cash: amount the customer handed over.
    pub tendered_cents: Option<i64>,
    /// For cash: change returned.
    pub change_cents: Option<i64>,
    /// Charge id from the external processor, when method is Card.
    pub processor_charge_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A saved card: processor token plus masked display metadata.
/// The raw token is never serialized out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditCard {
    pub id: i64,
    pub customer_id: i64,
    #[serde(skip_serializing)]
    pub processor_token: String,
    pub brand: Option<String>,
    pub card_last_4: String,
    pub exp_month: i64,
    pub exp_year: i64,
    pub is_default: bool,
}

// =============================================================================
// Notifications, Deliveries, Messages
// =============================================================================

/// A customer-scoped notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub customer_id: i64,
    /// Free-form category: "Order Ready", "Delivery Update", ...
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A delivery pickup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Delivery {
    pub id: i64,
    pub customer_id: i64,
    pub address: String,
    pub pickup_date: String,
    pub notes: Option<String>,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

/// A saved delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryAddress {
    pub id: i64,
    pub customer_id: i64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A message between an employee and a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_balance_and_paid() {
        let mut ticket = Ticket {
            id: 1,
            customer_id: 1,
            ticket_type_id: 1,
            employee_id: 1,
            ticket_number: 100,
            total_price_cents: 2500,
            payment_cents: 1000,
            picked_up: false,
            pieces: 3,
            notes: None,
            all_notes: None,
            delivery_status: DeliveryStatus::Pending,
            date_created: Utc::now(),
            date_due: Utc::now(),
        };

        assert_eq!(ticket.balance().cents(), 1500);
        assert!(!ticket.is_paid());

        ticket.payment_cents = 2500;
        assert_eq!(ticket.balance().cents(), 0);
        assert!(ticket.is_paid());
    }

    #[test]
    fn test_line_total() {
        let line = TicketGarment {
            id: 1,
            ticket_id: 1,
            garment_variant_id: 7,
            quantity: 4,
            price_cents: 350,
        };
        assert_eq!(line.line_total().cents(), 1400);
    }

    #[test]
    fn test_delivery_status_default() {
        assert_eq!(DeliveryStatus::default(), DeliveryStatus::Pending);
    }
}
