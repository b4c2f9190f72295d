//! # Workflow State
//!
//! The current view, the sale from the last checkout, the in-flight
//! checkout flag and the running payment watcher.
//!
//! ## View Machine
//! ```text
//! login ──► dashboard ──► new-sale ──► payment-method ──┬─► payment-confirmation (CASH)
//!              │                                        │
//!              ├──► products                            └─► payment-waiting (PIX / link)
//!              ├──► sales-history                                │ watcher: PAID
//!              └──► profile                                      ▼
//!                                                     payment-confirmation
//! ```
//!
//! All transitions are caller-driven except `payment-waiting →
//! payment-confirmation`, which the watcher drives through
//! [`WorkflowState::confirm_payment`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::watcher::WatcherHandle;
use raiz_core::{PaymentMethod, SaleStatus, View};

/// The sale created by the last checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSale {
    pub sale_id: String,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub total_cents: i64,
}

#[derive(Debug, Default)]
struct Workflow {
    view: View,
    sale: Option<CurrentSale>,
}

#[derive(Debug, Default)]
pub struct WorkflowState {
    workflow: Mutex<Workflow>,
    checkout_in_flight: AtomicBool,
    watcher: Mutex<Option<WatcherHandle>>,
}

/// Clears the in-flight flag when the checkout ends, however it ends.
#[derive(Debug)]
pub struct CheckoutGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.lock().view
    }

    pub fn set_view(&self, view: View) {
        let mut workflow = self.lock();
        if workflow.view != view {
            debug!(from = %workflow.view, to = %view, "View changed");
            workflow.view = view;
        }
    }

    pub fn current_sale(&self) -> Option<CurrentSale> {
        self.lock().sale.clone()
    }

    pub fn set_sale(&self, sale: CurrentSale) {
        self.lock().sale = Some(sale);
    }

    pub fn clear_sale(&self) {
        self.lock().sale = None;
    }

    /// Marks a checkout as running. `None` if one already is.
    pub fn begin_checkout(&self) -> Option<CheckoutGuard<'_>> {
        self.checkout_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CheckoutGuard {
                flag: &self.checkout_in_flight,
            })
    }

    pub fn checkout_in_flight(&self) -> bool {
        self.checkout_in_flight.load(Ordering::Acquire)
    }

    /// Watcher callback target.
    ///
    /// Moves `payment-waiting → payment-confirmation` when `sale_id` is the
    /// current sale. Returns whether the view changed; repeated calls and
    /// calls for a stale sale change nothing.
    pub fn confirm_payment(&self, sale_id: &str) -> bool {
        let mut workflow = self.lock();
        let Some(sale) = workflow.sale.as_mut().filter(|s| s.sale_id == sale_id) else {
            debug!(sale_id = %sale_id, "Ignoring confirmation for another sale");
            return false;
        };

        sale.status = SaleStatus::Paid;
        if workflow.view != View::PaymentWaiting {
            return false;
        }

        workflow.view = View::PaymentConfirmation;
        info!(sale_id = %sale_id, "Payment confirmed, showing confirmation");
        true
    }

    /// Installs the watcher for a new sale, stopping the previous one.
    pub fn replace_watcher(&self, handle: WatcherHandle) {
        let previous = self.watcher_slot().replace(handle);
        if let Some(previous) = previous {
            previous.stop();
        }
    }

    /// Stops and drops the running watcher, if any.
    pub fn stop_watcher(&self) {
        if let Some(handle) = self.watcher_slot().take() {
            handle.stop();
        }
    }

    /// Sale id of the installed watcher.
    pub fn watched_sale(&self) -> Option<String> {
        self.watcher_slot().as_ref().map(|h| h.sale_id().to_string())
    }

    /// Back to `login` with no sale and no watcher.
    pub fn reset(&self) {
        self.stop_watcher();
        let mut workflow = self.lock();
        workflow.view = View::Login;
        workflow.sale = None;
    }

    fn lock(&self) -> MutexGuard<'_, Workflow> {
        self.workflow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn watcher_slot(&self) -> MutexGuard<'_, Option<WatcherHandle>> {
        self.watcher.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
