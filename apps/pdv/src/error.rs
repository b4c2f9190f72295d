//! # API Error Type
//!
//! Unified error type for every command of the session layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in PDV Raiz                               │
//! │                                                                         │
//! │  Screen                      Session layer                              │
//! │  ──────                      ─────────────                              │
//! │                                                                         │
//! │  create_sale(pix)                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Gateway Error? ─── DbError::Rejected("...") ──────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule Error? ───── CoreError::StoreNotFound ───── ApiError ────►│  │
//! │  │         │                                          │            │  │
//! │  │         │                                          ▼            │  │
//! │  │         │                              DialogService::show_error │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `code` is for the screen logic, the `message` is what the error
//! dialog shows.

use serde::Serialize;
use tracing::error;

use crate::config::ConfigError;
use raiz_core::{CoreError, ValidationError};
use raiz_db::DbError;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "STORE_NOT_FOUND",
///   "message": "No store found for the current user"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule refused the operation
    BusinessLogic,

    Internal,

    /// Cart operation failed
    CartError,

    /// No store resolvable for the signed-in user
    StoreNotFound,

    /// Missing session, bad credentials or bad token
    AuthError,

    /// Payment option or payment status problem
    PaymentError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BusinessLogic, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::AuthError, message)
    }
}

/// Converts gateway errors to API errors.
///
/// Opaque failures are logged here and replaced by a generic message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::Rejected(reason) => {
                ApiError::new(ErrorCode::BusinessLogic, format!("Sale rejected: {}", reason))
            }
            DbError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::CartError,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    product, available, requested
                ),
            ),
            DbError::InvalidCredentials => ApiError::auth("Invalid email or password"),
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::ProductUnavailable(_) | CoreError::EmptyCart => {
                ApiError::new(ErrorCode::CartError, message)
            }
            CoreError::StoreNotFound => ApiError::new(ErrorCode::StoreNotFound, message),
            CoreError::NotAuthenticated => ApiError::auth(message),
            CoreError::NavigationDenied { .. } => ApiError::business(message),
            CoreError::InvalidPaymentChoice(_) => ApiError::new(ErrorCode::PaymentError, message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        error!("Configuration error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type of every command.
pub type ApiResult<T> = Result<T, ApiError>;
