//! # pressline-core: Pure Business Logic for Pressline POS
//!
//! This crate is the **heart** of Pressline POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pressline POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    REST API (axum)                              │   │
//! │  │    auth, customers, tickets, payments, cards, deliveries        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pressline-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────┐ ┌─────────┐ ┌────────────┐  │   │
//! │  │   │ types  │ │ money  │ │ ticket │ │ payment │ │   access   │  │   │
//! │  │   │ rows + │ │ cents, │ │ drafts │ │ allocate│ │ role/perm  │  │   │
//! │  │   │ enums  │ │ tax    │ │ + tabs │ │ + cash  │ │ evaluation │  │   │
//! │  │   └────────┘ └────────┘ └────────┘ └─────────┘ └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pressline-db (Database Layer)                   │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Ticket, Payment, catalog, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ticket`] - Draft-ticket composition and totals
//! - [`payment`] - Payment allocation and cash tender rules
//! - [`access`] - Role/permission evaluation
//! - [`validation`] - Field validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod payment;
pub mod ticket;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pressline_core::Money` instead of
// `use pressline_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate, FLAT_TAX};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of composition tabs per drafting session.
///
/// ## Business Reason
/// A quick ticket captures at most three service groups (the physical
/// tag has three stubs), so a drafting session converts into at most
/// three detailed tickets.
pub const MAX_TICKET_TABS: usize = 3;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents fat-finger orders (typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
