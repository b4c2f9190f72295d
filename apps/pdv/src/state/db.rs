//! # Database State
//!
//! Wraps the `Database` handle for the commands.
//!
//! `Database` holds a `SqlitePool` and the payment change channel, both
//! safe to share, so commands query concurrently without extra locking.

use std::sync::Arc;

use crate::watcher::PaymentFeed;
use raiz_db::Database;

#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let products = ctx.db.inner().products().list_sellable(&store_id).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// The database as the payment watcher's feed.
    pub fn payment_feed(&self) -> Arc<dyn PaymentFeed> {
        Arc::new(self.db.clone())
    }
}
