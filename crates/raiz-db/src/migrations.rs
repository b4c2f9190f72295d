//! # Database Migrations
//!
//! Embedded SQL migrations for PDV Raiz.
//!
//! ## Adding New Migrations
//!
//! 1. Create `crates/raiz-db/migrations/NNNN_description.sql`
//! 2. **NEVER** modify an applied migration - always add a new one
//! 3. Keep statements idempotent (`IF NOT EXISTS`)

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Every file under `migrations/`, embedded at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Applies pending migrations in filename order, each in its own
/// transaction. Safe to run on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
