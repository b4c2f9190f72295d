//! # raiz-core: Pure Business Logic for PDV Raiz
//!
//! This crate contains the rules every other layer relies on, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PDV Raiz Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Mobile-web frontend (screens)                   │   │
//! │  │   Login ──► Catálogo ──► Nova venda ──► Pagamento ──► Histórico │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                raiz-pdv (session + commands)                    │   │
//! │  │   sign_in, add_to_cart, create_sale, payment watcher, dialogs   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ raiz-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   view    │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   View    │  │   │
//! │  │   │   Sale    │  │  R$ 0,00  │  │ CartItem  │  │  rules    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    raiz-db (Data Gateway)                       │   │
//! │  │      SQLite tables, create_sale_transaction, change feed        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Store, Sale, Payment, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart: stock ceiling, removal, total
//! - [`view`] - Screen states and navigation guards
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use raiz_core::money::Money;
//!
//! let corte = Money::from_cents(4000); // R$ 40,00
//! let total = corte.multiply_quantity(2) + Money::from_cents(3000);
//!
//! assert_eq!(total.cents(), 11000);
//! assert_eq!(total.to_string(), "R$ 110,00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartAdd, CartItem, CartRemove, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use view::{NavigationContext, View};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Interval between payment-status polls while a sale waits for payment.
///
/// The change-notification channel is the primary signal; the poll is the
/// fallback for dropped or late push events.
pub const PAYMENT_POLL_INTERVAL_MS: u64 = 3000;

/// Store name used when a store is auto-created on first login.
pub const DEFAULT_STORE_NAME: &str = "Minha Loja";
