//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│   Sale   │       │
//! │  │  Cart    │     │          │     │  Method  │     │ created  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │                                  │             │
//! │       │           add_to_cart                       create_sale         │
//! │       │           remove_from_cart                  (sale.rs)           │
//! │       │                                                   │             │
//! │       └──────── navigate(new-sale) / clear_cart ◄────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use crate::commands::store::resolve_store_id;
use crate::error::ApiResult;
use crate::state::AppContext;
use raiz_core::{CartAdd, CartRemove, CartTotals, CoreError};

/// Cart after an add or remove, with what the call did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdate<T> {
    pub outcome: T,
    pub cart: CartTotals,
}

/// Gets the current cart contents.
///
/// ## Returns
/// Entries with line prices plus the recomputed total
pub fn get_cart(ctx: &AppContext) -> CartTotals {
    debug!("get_cart command");
    ctx.cart.with_cart(|c| CartTotals::from(c))
}

/// Adds one unit of a product.
///
/// The product is re-read so the stock ceiling is current. Reaching the
/// ceiling is not an error: the outcome says `at_stock_limit` and the
/// cart is unchanged.
///
/// ## Errors
/// * `NOT_FOUND` - Product missing or from another store
/// * `CART_ERROR` - Product was deactivated
pub async fn add_to_cart(ctx: &AppContext, product_id: &str) -> ApiResult<CartUpdate<CartAdd>> {
    debug!(product_id = %product_id, "add_to_cart command");

    let store_id = resolve_store_id(ctx).await?;
    let product = ctx
        .db
        .inner()
        .products()
        .get_for_store(&store_id, product_id)
        .await?;

    if !product.active {
        return Err(CoreError::ProductUnavailable(product.name).into());
    }

    let (outcome, cart) = ctx.cart.with_cart_mut(|cart| {
        let outcome = cart.add(&product);
        (outcome, CartTotals::from(&*cart))
    });

    debug!(product_id = %product_id, ?outcome, total_cents = cart.total_cents, "Cart add");
    Ok(CartUpdate { outcome, cart })
}

/// Removes one unit of a product. Absent products are a no-op.
pub fn remove_from_cart(ctx: &AppContext, product_id: &str) -> CartUpdate<CartRemove> {
    debug!(product_id = %product_id, "remove_from_cart command");

    let (outcome, cart) = ctx.cart.with_cart_mut(|cart| {
        let outcome = cart.remove(product_id);
        (outcome, CartTotals::from(&*cart))
    });

    CartUpdate { outcome, cart }
}

pub fn clear_cart(ctx: &AppContext) -> CartTotals {
    debug!("clear_cart command");

    ctx.cart.with_cart_mut(|cart| {
        cart.clear();
        CartTotals::from(&*cart)
    })
}
