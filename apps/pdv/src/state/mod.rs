//! # State Module
//!
//! Session state of the point of sale, split by concern and bundled into
//! one [`AppContext`] that every command receives by reference.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         AppContext                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │            │             │              │             │         │
//! │       ▼            ▼             ▼              ▼             ▼         │
//! │  ┌─────────┐ ┌───────────┐ ┌───────────┐ ┌─────────────┐ ┌─────────┐   │
//! │  │ DbState │ │ CartState │ │ AuthState │ │WorkflowState│ │ Dialogs │   │
//! │  │ pool +  │ │ Mutex<    │ │ session,  │ │ view, sale, │ │ FIFO    │   │
//! │  │ channel │ │   Cart>   │ │ store id  │ │ watcher     │ │ queue   │   │
//! │  └─────────┘ └───────────┘ └───────────┘ └─────────────┘ └─────────┘   │
//! │                                                                         │
//! │  ConfigState (AppConfig) and SessionManager are read-only.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod cart;
mod db;
mod workflow;

use std::sync::Arc;

use tracing::info;

pub use auth::{AuthState, Session};
pub use cart::CartState;
pub use db::DbState;
pub use workflow::{CheckoutGuard, CurrentSale, WorkflowState};

use crate::config::AppConfig;
use crate::dialog::DialogService;
use crate::error::ApiResult;
use crate::session::SessionManager;
use raiz_db::{Database, DbConfig};

/// Configuration is read-only after startup.
pub type ConfigState = AppConfig;

/// Everything a command can touch. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db: Arc<DbState>,
    pub cart: Arc<CartState>,
    pub auth: Arc<AuthState>,
    pub workflow: Arc<WorkflowState>,
    pub config: Arc<ConfigState>,
    pub sessions: Arc<SessionManager>,
    pub dialogs: DialogService,
}

impl AppContext {
    /// Builds a signed-out context over an open database.
    pub fn new(db: Database, config: AppConfig) -> Self {
        let sessions = SessionManager::new(&config.auth.jwt_secret, config.auth.session_lifetime_secs);

        AppContext {
            db: Arc::new(DbState::new(db)),
            cart: Arc::new(CartState::new()),
            auth: Arc::new(AuthState::new()),
            workflow: Arc::new(WorkflowState::new()),
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            dialogs: DialogService::new(),
        }
    }

    /// Opens the configured database (migrating it) and builds the context.
    pub async fn open(config: AppConfig) -> ApiResult<Self> {
        let path = config.database_path()?;
        info!(?path, "Database path determined");

        let db = Database::new(
            DbConfig::new(path).max_connections(config.database.max_connections),
        )
        .await?;
        info!("Database connected and migrations applied");

        Ok(Self::new(db, config))
    }
}
