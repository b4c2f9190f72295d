//! # Validation Module
//!
//! Business rule checks for form input, run by the command layer before
//! anything reaches the data gateway.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen form ──► command (raiz-pdv) ──► THIS MODULE ──► raiz-db        │
//! │                                              │            │             │
//! │                                              ▼            ▼             │
//! │                                    ValidationError    CHECK / UNIQUE    │
//! │                                    (error dialog)     constraints       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use raiz_core::validation::{validate_product_name, validate_stock};
//!
//! validate_product_name("Corte de Cabelo").unwrap();
//! assert!(validate_stock(-1).is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted on sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("name"));
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a price in centavos. Zero is allowed (courtesy services).
///
/// ```rust
/// use raiz_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(4000).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Trims optional free text, mapping blank to `None`.
///
/// ## Rules
/// - At most `max` characters after trimming
pub fn normalize_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(Some(value.to_string()))
}

// =============================================================================
// Store Profile
// =============================================================================

pub fn validate_store_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("store name"));
    }
    if name.chars().count() > 120 {
        return Err(ValidationError::TooLong {
            field: "store name".to_string(),
            max: 120,
        });
    }
    Ok(())
}

// =============================================================================
// Credentials
// =============================================================================

/// Validates an email address and returns it trimmed and lower-cased.
///
/// Only the shape is checked: one `@` with a non-empty local part and a
/// domain containing a dot.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(required("email"));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "expected name@domain".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(email)
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Corte de Cabelo").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(200)).is_ok());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(12).is_ok());
        assert!(matches!(
            validate_stock(-1),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text("address", None, 10).unwrap(), None);
        assert_eq!(normalize_optional_text("address", Some("  "), 10).unwrap(), None);
        assert_eq!(
            normalize_optional_text("address", Some(" Rua A "), 10).unwrap(),
            Some("Rua A".to_string())
        );
        assert!(normalize_optional_text("address", Some("Rua muito longa"), 5).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email(" Ana@Example.com ").unwrap(),
            "ana@example.com"
        );
        assert!(validate_email("").is_err());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("ana@@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("segredo").is_ok());
        assert!(matches!(
            validate_password("123"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_store_name() {
        assert!(validate_store_name("Barbearia Raiz").is_ok());
        assert!(validate_store_name("").is_err());
    }
}
