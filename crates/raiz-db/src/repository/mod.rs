//! # Repository Module
//!
//! One repository per table (or view) of the gateway.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command handler                                                       │
//! │       │  db.products().list_sellable(&store_id)                        │
//! │       ▼                                                                 │
//! │  ProductRepository ── SQL ──► SQLite                                   │
//! │                                                                         │
//! │  Handlers never write SQL; repositories never know about views,        │
//! │  sessions or dialogs.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Sign-up and credential checks
//! - [`store::StoreRepository`] - Store per owner, profile edits
//! - [`product::ProductRepository`] - Catalog CRUD (soft delete)
//! - [`sale::SaleRepository`] - `create_sale_transaction`, history
//! - [`payment::PaymentRepository`] - Payment status reads and settlement
//! - [`analytics::AnalyticsRepository`] - `store_analytics` view

pub mod analytics;
pub mod payment;
pub mod product;
pub mod sale;
pub mod store;
pub mod user;

use uuid::Uuid;

/// New primary key.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
