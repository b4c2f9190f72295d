//! # PDV Raiz Entry Point
//!
//! Opens the configured database, applies migrations and reports whether
//! the session layer is ready to serve the screens.
//!
//! ## Usage
//! ```text
//! raiz-pdv [path/to/pdv.toml]
//! ```
//!
//! Without an argument the platform config directory is searched for
//! `pdv.toml`; a missing file means defaults plus `PDV_*` overrides.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use raiz_pdv::commands::navigation::current_view;
use raiz_pdv::{bootstrap, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    info!("Starting PDV Raiz");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    let ctx = match bootstrap(config_path).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(code = ?e.code, "Startup failed: {}", e.message);
            return ExitCode::FAILURE;
        }
    };

    if !ctx.db.inner().health_check().await {
        error!("Database health check failed");
        return ExitCode::FAILURE;
    }

    info!(view = %current_view(&ctx), "PDV Raiz ready");
    ctx.db.inner().close().await;
    ExitCode::SUCCESS
}
