//! # Error Types
//!
//! Domain-specific error types for pressline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pressline-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  pressline-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  REST API errors (in app)                                              │
//! │  └── ApiError         - What clients see (HTTP status + JSON)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ticket number, field, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A ticket was submitted without any line items.
    ///
    /// ## When This Occurs
    /// - Creating a detailed ticket from a tab with no garments added
    #[error("Ticket has no garments; add at least one line item")]
    EmptyTicket,

    /// Tab index outside the drafting workspace.
    #[error("Tab index {index} is out of range (max {max})")]
    TabOutOfRange { index: usize, max: usize },

    /// Quantity outside the accepted range.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Line item not present in the draft.
    #[error("Garment variant {0} is not in this ticket")]
    LineNotFound(i64),

    /// Cash tendered is below the amount due.
    ///
    /// ## When This Occurs
    /// - Cash payment where tendered < total; the payment is rejected
    ///   rather than recorded short.
    #[error("Insufficient cash: tendered {tendered_cents} cents, due {due_cents} cents")]
    InsufficientTender {
        tendered_cents: i64,
        due_cents: i64,
    },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("Field '{field}' is required")]
    Required { field: String },

    /// A field exceeds its maximum length.
    #[error("Field '{field}' exceeds maximum length of {max}")]
    TooLong { field: String, max: usize },

    /// A field has an invalid format.
    #[error("Field '{field}' is invalid: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A numeric field is out of range.
    #[error("Field '{field}' must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
