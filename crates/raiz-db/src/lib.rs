//! # raiz-db: Data Gateway for PDV Raiz
//!
//! Tables, the atomic sale procedure and the payment change channel,
//! backed by SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PDV Raiz Data Flow                               │
//! │                                                                         │
//! │  raiz-pdv command (create_sale)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     raiz-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ users, stores  │   │  (embedded)  │  │   │
//! │  │   │               │    │ products,sales │   └──────────────┘  │   │
//! │  │   │ SqlitePool    │    │ payments,      │   ┌──────────────┐  │   │
//! │  │   │ Notifier      │───►│ analytics      │   │  notify.rs   │  │   │
//! │  │   └───────────────┘    └────────────────┘   │  broadcast   │  │   │
//! │  │                                             └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (path from pdv.toml)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool and the `Database` handle
//! - [`migrations`] - Embedded database migrations
//! - [`notify`] - Payment change notifications
//! - [`password`] - Credential hashing
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table or view
//!
//! ## Usage
//!
//! ```rust,ignore
//! use raiz_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pdv.db")).await?;
//! let products = db.products().list_sellable(&store_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod notify;
pub mod password;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use notify::{ChangeNotifier, PaymentChange, PaymentSubscription};
pub use pool::{Database, DbConfig};

pub use repository::analytics::AnalyticsRepository;
pub use repository::payment::PaymentRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::store::StoreRepository;
pub use repository::user::UserRepository;
