//! # PDV Raiz Session Library
//!
//! Session layer of the PDV Raiz point-of-sale: everything between the
//! mobile-web screens and the data gateway.
//!
//! ## Module Organization
//! ```text
//! raiz_pdv/
//! ├── lib.rs          ◄─── You are here (startup, tracing)
//! ├── config.rs       ◄─── pdv.toml + PDV_* environment
//! ├── error.rs        ◄─── ApiError { code, message } for commands
//! ├── session.rs      ◄─── Signed session tokens
//! ├── dialog.rs       ◄─── FIFO alert / error / success / confirm queue
//! ├── watcher.rs      ◄─── Payment watcher (push + poll, first wins)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppContext
//! │   ├── db.rs       ◄─── Database wrapper
//! │   ├── cart.rs     ◄─── Cart behind a mutex
//! │   ├── auth.rs     ◄─── Signed-in user and store id
//! │   └── workflow.rs ◄─── Current view, current sale, checkout guard
//! └── commands/       ◄─── One async fn per screen action
//! ```
//!
//! ## Session Context
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AppContext (Clone)                             │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │   DbState    │ │  CartState   │ │  AuthState   │ │WorkflowState │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │ • pool       │ │ • items      │ │ • user id    │ │ • view       │   │
//! │  │ • repos      │ │ • total      │ │ • token      │ │ • sale       │   │
//! │  │ • change feed│ │ • checkout   │ │ • store id   │ │ • watcher    │   │
//! │  │              │ │   key        │ │              │ │ • in flight  │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  ConfigState · SessionManager · DialogService                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes `&AppContext` and touches only the parts it needs.

pub mod commands;
pub mod config;
pub mod dialog;
pub mod error;
pub mod session;
pub mod state;
pub mod watcher;

use std::path::PathBuf;

use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

pub use config::AppConfig;
pub use dialog::{DialogKind, DialogRequest, DialogService};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppContext;
pub use watcher::{PaymentFeed, PaymentWatcher, WatcherHandle};

/// Loads the configuration and opens the session context.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load configuration ── defaults → pdv.toml → PDV_* env → validate    │
/// │                                                                         │
/// │  2. Determine database path                                             │
/// │     • PDV_DB_PATH / [database] path, or                                 │
/// │     • Linux: ~/.local/share/pdv/pdv.db                                  │
/// │     • macOS: ~/Library/Application Support/br.raiz.pdv/pdv.db          │
/// │                                                                         │
/// │  3. Connect to database                                                 │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Build AppContext (signed out, view = login)                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn bootstrap(config_path: Option<PathBuf>) -> ApiResult<AppContext> {
    let config = AppConfig::load(config_path)?;
    info!(
        poll_interval_ms = config.payments.poll_interval_ms,
        default_store = %config.store.default_name,
        "Configuration loaded"
    );

    let ctx = AppContext::open(config).await?;

    match raiz_db::migrations::migration_status(ctx.db.inner().pool()).await {
        Ok((total, applied)) => info!(total, applied, "Migration status"),
        Err(e) => warn!(error = %e, "Could not read migration status"),
    }

    Ok(ctx)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=raiz=trace` - Show trace for raiz crates only
/// - Default: `info,raiz=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,raiz=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
