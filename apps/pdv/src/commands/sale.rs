//! # Sale Command
//!
//! Finalizes the cart into a sale and routes to the next view.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale(choice)                                                    │
//! │       │                                                                 │
//! │       ├── checkout already in flight? ──► BUSINESS_LOGIC                │
//! │       ├── cart empty? ──────────────────► CART_ERROR                    │
//! │       ├── resolve store (cached → re-fetch once) ──► STORE_NOT_FOUND    │
//! │       ▼                                                                 │
//! │  create_sale_transaction(store, total, lines, method, checkout key)     │
//! │       │                                                                 │
//! │       ├── Err ──► error dialog, cart and view unchanged                 │
//! │       ▼                                                                 │
//! │  status PAID (cash) ─────► payment-confirmation                         │
//! │  status PENDING ─────────► payment-waiting + PaymentWatcher             │
//! │                                 │ PAID (push or poll, first wins)       │
//! │                                 ▼                                       │
//! │                            payment-confirmation                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A retry of an unchanged cart with the same payment method reuses the
//! cart's checkout key, so a sale is never written twice for the same
//! checkout. Picking another method is a new checkout: the earlier pending
//! sale stays `PENDING` in history and the new sale follows its own method.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::commands::store::resolve_store_id;
use crate::commands::surface;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppContext, CurrentSale};
use crate::watcher::PaymentWatcher;
use raiz_core::{
    CoreError, PaymentChoice, PaymentMethod, SaleStatus, SaleTransactionRequest, View,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOutcome {
    pub sale_id: String,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    pub total_cents: i64,
    /// Where the workflow landed.
    pub view: View,
}

/// Creates the sale for the current cart.
///
/// ## Errors
/// Every error is also queued as an error dialog, except the in-flight
/// refusal (the first request is still going to report).
/// * `BUSINESS_LOGIC` - Another checkout is in flight, or the gateway rejected the sale
/// * `CART_ERROR` - Cart empty or stock ran out
/// * `STORE_NOT_FOUND` - No store for the user
pub async fn create_sale(ctx: &AppContext, choice: PaymentChoice) -> ApiResult<SaleOutcome> {
    debug!(?choice, "create_sale command");

    let Some(_checkout) = ctx.workflow.begin_checkout() else {
        return Err(ApiError::business("A sale is already being created"));
    };

    let request = match build_request(ctx, choice).await {
        Ok(request) => request,
        Err(e) => return Err(surface(ctx, e)),
    };

    let result = match ctx
        .db
        .inner()
        .sales()
        .create_sale_transaction(&request)
        .await
    {
        Ok(result) => result,
        Err(e) => return Err(surface(ctx, e)),
    };

    if let Some(previous) = ctx.workflow.current_sale() {
        if previous.sale_id != result.sale_id && previous.status == SaleStatus::Pending {
            info!(
                sale_id = %previous.sale_id,
                method = %previous.payment_method,
                "Pending sale left unpaid for a new checkout"
            );
        }
    }

    info!(
        sale_id = %result.sale_id,
        status = ?result.status,
        method = %request.payment_method,
        total = request.total_cents,
        items = request.items.len(),
        "Sale created"
    );

    ctx.workflow.set_sale(CurrentSale {
        sale_id: result.sale_id.clone(),
        payment_method: request.payment_method,
        status: result.status,
        total_cents: request.total_cents,
    });

    // The view must be payment-waiting before the watcher can confirm.
    let view = if result.status == SaleStatus::Paid {
        ctx.workflow.stop_watcher();
        ctx.workflow.set_view(View::PaymentConfirmation);
        View::PaymentConfirmation
    } else {
        ctx.workflow.set_view(View::PaymentWaiting);
        start_watcher(ctx, &result.sale_id);
        View::PaymentWaiting
    };

    Ok(SaleOutcome {
        sale_id: result.sale_id,
        status: result.status,
        payment_method: request.payment_method,
        total_cents: request.total_cents,
        view,
    })
}

/// Sale id and status of the sale from the last checkout.
pub fn current_sale(ctx: &AppContext) -> Option<CurrentSale> {
    ctx.workflow.current_sale()
}

async fn build_request(
    ctx: &AppContext,
    choice: PaymentChoice,
) -> ApiResult<SaleTransactionRequest> {
    let method = choice.method();
    let snapshot = ctx.cart.with_cart_mut(|cart| {
        if cart.is_empty() {
            return None;
        }
        Some((cart.sale_lines(), cart.total(), cart.checkout_key(method)))
    });
    let (items, total, key) = snapshot.ok_or(CoreError::EmptyCart)?;

    let store_id = resolve_store_id(ctx).await?;

    Ok(SaleTransactionRequest {
        store_id,
        total_cents: total.cents(),
        items,
        payment_method: method,
        idempotency_key: Some(key),
    })
}

/// Replaces any running watcher with one for `sale_id`.
pub(crate) fn start_watcher(ctx: &AppContext, sale_id: &str) {
    let workflow = Arc::clone(&ctx.workflow);
    let handle = PaymentWatcher::spawn(
        ctx.db.payment_feed(),
        sale_id,
        ctx.config.poll_interval(),
        move |sale_id, _by| {
            workflow.confirm_payment(sale_id);
        },
    );
    ctx.workflow.replace_watcher(handle);
}
