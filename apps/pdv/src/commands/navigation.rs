//! # Navigation Command
//!
//! Guarded view changes with their side effects.
//!
//! ## Side Effects
//! ```text
//! leaving payment-waiting  ──► watcher stopped (subscription + timer)
//! entering payment-waiting ──► watcher started for the held unpaid sale
//! entering new-sale        ──► cart cleared, previous sale forgotten
//! ```

use serde::Serialize;
use tracing::debug;

use crate::commands::sale::start_watcher;
use crate::error::ApiResult;
use crate::state::AppContext;
use raiz_core::view::check_navigation;
use raiz_core::{NavigationContext, SaleStatus, View};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationResponse {
    pub from: View,
    pub view: View,
}

/// Moves to `to` if the guards allow it.
///
/// ## Errors
/// * `BUSINESS_LOGIC` - Guard refused (no session, empty cart, no sale,
///   confirmation before payment)
pub fn navigate(ctx: &AppContext, to: View) -> ApiResult<NavigationResponse> {
    debug!(to = %to, "navigate command");

    let sale = ctx.workflow.current_sale();
    let guard_ctx = NavigationContext {
        authenticated: ctx.auth.is_signed_in(),
        cart_total: ctx.cart.with_cart(|c| c.total()),
        has_sale: sale.is_some(),
        sale_paid: sale.as_ref().is_some_and(|s| s.status == SaleStatus::Paid),
    };
    check_navigation(to, &guard_ctx)?;

    let from = ctx.workflow.view();

    if from == View::PaymentWaiting && to != View::PaymentWaiting {
        ctx.workflow.stop_watcher();
    }

    if to == View::NewSale {
        ctx.cart.clear();
        ctx.workflow.clear_sale();
    }

    ctx.workflow.set_view(to);

    // The guard only lets an unpaid held sale through to payment-waiting.
    if let Some(sale) = sale.filter(|_| to == View::PaymentWaiting) {
        if ctx.workflow.watched_sale().as_deref() != Some(sale.sale_id.as_str()) {
            start_watcher(ctx, &sale.sale_id);
        }
    }

    Ok(NavigationResponse { from, view: to })
}

/// The view on screen.
pub fn current_view(ctx: &AppContext) -> View {
    ctx.workflow.view()
}
