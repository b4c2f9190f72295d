//! # Domain Types
//!
//! Core domain types used throughout PDV Raiz.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Store       │   │      Sale       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  store_id       │◄──│  sale_id        │       │
//! │  │  owner_id       │   │  total_cents    │   │  method         │       │
//! │  │  name, address  │   │  status         │   │  status         │       │
//! │  └────────▲────────┘   └────────▲────────┘   └─────────────────┘       │
//! │           │                     │                                       │
//! │  ┌────────┴────────┐   ┌────────┴────────┐                              │
//! │  │    Product      │   │    SaleItem     │  (immutable snapshot of      │
//! │  │  price_cents    │   │  product_name   │   name + price at sale time) │
//! │  │  stock, active  │   │  unit_price     │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Codes
//! Statuses and payment methods travel as upper-case codes
//! (`PENDING`, `PAID`, `CASH`, `PIX`, `CREDIT_CARD`), matching the columns of
//! the `sales` and `payments` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// An account that can sign in. Each user owns at most one store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string. Never leaves the backend.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Store
// =============================================================================

/// The merchant's store. Auto-created on first login if absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: String,
    /// User that owns this store.
    pub owner_id: String,
    pub name: String,
    pub address: Option<String>,
    /// Free text, e.g. "Seg-Sex 9h-18h".
    pub business_hours: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Editable store fields on the profile screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreProfile {
    pub name: String,
    pub address: Option<String>,
    pub business_hours: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product or service in the store catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Store this product belongs to.
    pub store_id: String,

    /// Display name shown on the catalog and frozen into sale items.
    pub name: String,

    pub description: Option<String>,

    /// Unit price in centavos.
    pub price_cents: i64,

    /// Units available. Never negative.
    pub stock: i64,

    /// Soft-delete flag. Inactive products are hidden from every list.
    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the product may be offered on the new-sale screen.
    pub fn is_sellable(&self) -> bool {
        self.active && self.stock > 0
    }
}

/// Catalog form input for creating or editing a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Waiting for an asynchronous payment (PIX / link).
    #[default]
    Pending,
    /// Paid: immediately for cash, later for PIX / link.
    Paid,
}

// =============================================================================
// Payment Status
// =============================================================================

/// The status of a payment row. Updated by the external payment system;
/// this application only observes the `PENDING → PAID` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    #[inline]
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Payment method code stored with the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash in hand. Created already paid.
    Cash,
    /// PIX instant payment. Confirmed asynchronously.
    Pix,
    /// Card payment through a payment link. Confirmed asynchronously.
    CreditCard,
}

impl PaymentMethod {
    /// Whether a payment with this method is settled at creation time.
    pub fn settles_immediately(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Upper-case code as stored in `payments.method`.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::CreditCard => "CREDIT_CARD",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Payment Choice
// =============================================================================

/// The option the cashier taps on the payment-method screen.
///
/// ## Normalization
/// ```text
/// cash ──► CASH
/// pix  ──► PIX
/// link ──► CREDIT_CARD
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentChoice {
    Cash,
    Pix,
    Link,
}

impl PaymentChoice {
    /// Normalizes the screen option to the stored method code.
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentChoice::Cash => PaymentMethod::Cash,
            PaymentChoice::Pix => PaymentMethod::Pix,
            PaymentChoice::Link => PaymentMethod::CreditCard,
        }
    }
}

impl FromStr for PaymentChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(PaymentChoice::Cash),
            "pix" => Ok(PaymentChoice::Pix),
            "link" => Ok(PaymentChoice::Link),
            other => Err(CoreError::InvalidPaymentChoice(other.to_string())),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale, created together with its items and payment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub store_id: String,
    pub total_cents: i64,
    pub status: SaleStatus,
    /// Client key that makes retries of the same checkout return this sale.
    pub idempotency_key: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// The payment record attached to a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Sale Transaction (remote procedure contract)
// =============================================================================

/// One entry of the line-item batch sent to `create_sale_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub product_name: String,
}

/// Arguments of `create_sale_transaction`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTransactionRequest {
    pub store_id: String,
    pub total_cents: i64,
    pub items: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    /// Repeating a key returns the sale created by the first call.
    pub idempotency_key: Option<String>,
}

impl SaleTransactionRequest {
    /// Sum of the line totals; must equal `total_cents`.
    pub fn items_total(&self) -> Money {
        self.items
            .iter()
            .map(|line| Money::from_cents(line.line_total_cents))
            .sum()
    }
}

/// Result of `create_sale_transaction`: `{ sale_id, status }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTransactionResult {
    pub sale_id: String,
    pub status: SaleStatus,
}

/// A sale with its line items and payment, for the history detail screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetails {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payment: Option<Payment>,
}

// =============================================================================
// Store Analytics
// =============================================================================

/// Per-store aggregates behind the dashboard (`store_analytics` view).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StoreAnalytics {
    pub store_id: String,
    pub sales_count: i64,
    pub paid_sales_count: i64,
    pub pending_sales_count: i64,
    pub paid_revenue_cents: i64,
    pub active_products: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_choice_normalization() {
        assert_eq!(PaymentChoice::Cash.method(), PaymentMethod::Cash);
        assert_eq!(PaymentChoice::Pix.method(), PaymentMethod::Pix);
        assert_eq!(PaymentChoice::Link.method(), PaymentMethod::CreditCard);
    }

    #[test]
    fn test_payment_choice_parsing() {
        assert_eq!("pix".parse::<PaymentChoice>().unwrap(), PaymentChoice::Pix);
        assert_eq!(" LINK ".parse::<PaymentChoice>().unwrap(), PaymentChoice::Link);
        assert_eq!("dinheiro".parse::<PaymentChoice>().unwrap(), PaymentChoice::Cash);
        assert!(matches!(
            "boleto".parse::<PaymentChoice>(),
            Err(CoreError::InvalidPaymentChoice(_))
        ));
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"CREDIT_CARD\""
        );
        assert_eq!(serde_json::to_string(&SaleStatus::Paid).unwrap(), "\"PAID\"");
        assert_eq!(
            serde_json::from_str::<PaymentStatus>("\"PENDING\"").unwrap(),
            PaymentStatus::Pending
        );
        assert_eq!(PaymentMethod::Pix.to_string(), "PIX");
    }

    #[test]
    fn test_only_cash_settles_immediately() {
        assert!(PaymentMethod::Cash.settles_immediately());
        assert!(!PaymentMethod::Pix.settles_immediately());
        assert!(!PaymentMethod::CreditCard.settles_immediately());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: "u1".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_items_total() {
        let request = SaleTransactionRequest {
            store_id: "s1".to_string(),
            total_cents: 11000,
            items: vec![
                SaleLine {
                    product_id: "p1".to_string(),
                    quantity: 2,
                    unit_price_cents: 4000,
                    line_total_cents: 8000,
                    product_name: "Corte de Cabelo".to_string(),
                },
                SaleLine {
                    product_id: "p2".to_string(),
                    quantity: 1,
                    unit_price_cents: 3000,
                    line_total_cents: 3000,
                    product_name: "Barba".to_string(),
                },
            ],
            payment_method: PaymentMethod::CreditCard,
            idempotency_key: None,
        };
        assert_eq!(request.items_total().cents(), 11000);
    }
}
