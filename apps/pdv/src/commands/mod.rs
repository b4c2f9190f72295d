//! # Commands Module
//!
//! One async function per screen action.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── auth.rs        ◄─── sign_up, sign_in, restore_session, sign_out
//! ├── store.rs       ◄─── store resolution, profile
//! ├── product.rs     ◄─── catalog CRUD with dialogs
//! ├── cart.rs        ◄─── cart manipulation
//! ├── navigation.rs  ◄─── guarded view changes
//! ├── sale.rs        ◄─── create_sale, payment watcher start
//! ├── history.rs     ◄─── sales list, sale details
//! └── dashboard.rs   ◄─── analytics summary
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen                                                                 │
//! │  ──────                                                                 │
//! │  add_to_cart(&ctx, product_id)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  async fn add_to_cart(                                                  │
//! │      ctx: &AppContext,     ◄── session context, passed explicitly      │
//! │      product_id: &str,     ◄── screen parameters                       │
//! │  ) -> ApiResult<CartUpdate>                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Serializable response or ApiError { code, message }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog, profile and sale failures are also queued as error dialogs;
//! the state that triggered them (cart, view) is left as it was.

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod history;
pub mod navigation;
pub mod product;
pub mod sale;
pub mod store;

use crate::error::ApiError;
use crate::state::AppContext;

/// Queues `err` as an error dialog and hands it back for `?`.
pub(crate) fn surface(ctx: &AppContext, err: impl Into<ApiError>) -> ApiError {
    let err = err.into();
    ctx.dialogs.report_error(err.message.clone());
    err
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use crate::commands::auth::{sign_up, SignInResponse};
    use crate::config::AppConfig;
    use crate::state::AppContext;
    use raiz_core::{Product, ProductInput, View};
    use raiz_db::{Database, DbConfig};

    pub async fn context() -> AppContext {
        context_with_poll(Duration::from_millis(3000)).await
    }

    pub async fn context_with_poll(poll: Duration) -> AppContext {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut config = AppConfig::default();
        config.payments.poll_interval_ms = poll.as_millis() as u64;
        AppContext::new(db, config)
    }

    /// Context with a signed-in user and a store.
    pub async fn signed_in() -> (AppContext, SignInResponse) {
        signed_in_with(context().await).await
    }

    pub async fn signed_in_with(ctx: AppContext) -> (AppContext, SignInResponse) {
        let response = sign_up(&ctx, "ana@example.com", "segredo123").await.unwrap();
        assert_eq!(ctx.workflow.view(), View::Dashboard);
        (ctx, response)
    }

    pub async fn product(ctx: &AppContext, name: &str, price_cents: i64, stock: i64) -> Product {
        let store_id = ctx.auth.store_id().unwrap();
        ctx.db
            .inner()
            .products()
            .create(
                &store_id,
                &ProductInput {
                    name: name.to_string(),
                    description: None,
                    price_cents,
                    stock,
                },
            )
            .await
            .unwrap()
    }
}
