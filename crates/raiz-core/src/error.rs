//! # Error Types
//!
//! Domain-specific error types for raiz-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  raiz-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  raiz-db errors (separate crate)                                       │
//! │  └── DbError          - Gateway operation failures                     │
//! │                                                                         │
//! │  raiz-pdv errors (app)                                                 │
//! │  └── ApiError         - What the screens see (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Dialog       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are translated to
/// user-facing messages by the app layer and shown in an error dialog.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (or was soft-deleted).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is not available for sale.
    #[error("Product {0} is not available for sale")]
    ProductUnavailable(String),

    /// The cart has nothing to sell.
    ///
    /// ## When This Occurs
    /// - Entering `payment-method` with a zero total
    /// - Calling `create_sale` after the cart was cleared
    #[error("Cart is empty")]
    EmptyCart,

    /// No store could be resolved for the signed-in user.
    ///
    /// ## User Workflow
    /// ```text
    /// create_sale(pix)
    ///      │
    ///      ▼
    /// store id cached? ── no ──► re-fetch once ── still none ──► StoreNotFound
    ///      │                                                      │
    ///      ▼                                                      ▼
    /// proceed                                       "Loja não encontrada" dialog
    /// ```
    #[error("No store found for the current user")]
    StoreNotFound,

    /// An operation that needs a session was called without one.
    #[error("Not signed in")]
    NotAuthenticated,

    /// A navigation call was refused by the view guards.
    #[error("Cannot open {to}: {reason}")]
    NavigationDenied { to: String, reason: String },

    /// Unknown payment option selected on the payment-method screen.
    #[error("Unknown payment option: {0}")]
    InvalidPaymentChoice(String),

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
/// Used for early validation before any gateway call.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed price, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
