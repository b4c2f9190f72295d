//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PDV_DB_PATH=/srv/pdv/pdv.db                                        │
//! │     PDV_PAYMENT_POLL_MS=3000                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pdv/pdv.toml (Linux)                                     │
//! │     ~/Library/Application Support/br.raiz.pdv/pdv.toml (macOS)         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pdv.toml
//! [database]
//! path = "/srv/pdv/pdv.db"
//! max_connections = 5
//!
//! [auth]
//! jwt_secret = "change-me"
//! session_lifetime_secs = 43200
//!
//! [payments]
//! poll_interval_ms = 3000
//!
//! [store]
//! default_name = "Minha Loja"
//! default_business_hours = "Seg-Sex 9h-18h"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use raiz_core::{DEFAULT_STORE_NAME, PAYMENT_POLL_INTERVAL_MS};

const CONFIG_FILE_NAME: &str = "pdv.toml";
const DB_FILE_NAME: &str = "pdv.db";

/// Errors while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No home directory to derive the data directory from.
    #[error("Could not determine app data directory")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file. Unset means `<data dir>/pdv.db`.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    pub session_lifetime_secs: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: "raiz-dev-secret".to_string(),
            session_lifetime_secs: 12 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    /// Fallback poll period of the payment watcher.
    pub poll_interval_ms: u64,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        PaymentSettings {
            poll_interval_ms: PAYMENT_POLL_INTERVAL_MS,
        }
    }
}

/// Values for the store created on a user's first sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub default_name: String,
    pub default_business_hours: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            default_name: DEFAULT_STORE_NAME.to_string(),
            default_business_hours: None,
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub payments: PaymentSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pdv.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// `<config dir>/pdv.toml` for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("br", "raiz", "pdv").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The configured database path, or `<data dir>/pdv.db`.
    ///
    /// The data directory is created when it is used.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("br", "raiz", "pdv").ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DB_FILE_NAME))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.payments.poll_interval_ms)
    }

    /// Rejects values the app cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".into()));
        }
        if self.auth.session_lifetime_secs <= 0 {
            return Err(ConfigError::Invalid(
                "auth.session_lifetime_secs must be greater than 0".into(),
            ));
        }
        if self.payments.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "payments.poll_interval_ms must be greater than 0".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        if self.store.default_name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.default_name must not be empty".into()));
        }
        Ok(())
    }

    /// Applies `PDV_*` overrides. Unparseable numbers are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("PDV_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(secret) = lookup("PDV_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(secs) = lookup("PDV_SESSION_LIFETIME_SECS").and_then(|v| v.parse().ok()) {
            self.auth.session_lifetime_secs = secs;
        }

        if let Some(ms) = lookup("PDV_PAYMENT_POLL_MS").and_then(|v| v.parse().ok()) {
            debug!(poll_interval_ms = ms, "Overriding payment poll interval from environment");
            self.payments.poll_interval_ms = ms;
        }

        if let Some(name) = lookup("PDV_DEFAULT_STORE_NAME") {
            self.store.default_name = name;
        }
    }
}
