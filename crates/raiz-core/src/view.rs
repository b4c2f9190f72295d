//! # Views
//!
//! The screens of the app and the rules for moving between them.
//!
//! ## Transition Map
//! ```text
//!                 ┌───────┐ sign_in
//!                 │ login │──────────┐
//!                 └───────┘          ▼
//!                             ┌────────────┐
//!      ┌──────────────────────│ dashboard  │───────────────────┐
//!      │                      └─────┬──────┘                   │
//!      ▼                            ▼                          ▼
//! ┌──────────┐              ┌──────────────┐          ┌───────────────┐
//! │ products │              │   new-sale   │          │ sales-history │
//! └──────────┘              └──────┬───────┘          └───────────────┘
//!                                  │ total > 0                 ▲
//!                                  ▼                           │
//!                          ┌────────────────┐                  │
//!                          │ payment-method │                  │
//!                          └───┬────────┬───┘                  │
//!                   PENDING    │        │  PAID (cash)         │
//!                              ▼        │                      │
//!                    ┌─────────────────┐│                      │
//!                    │ payment-waiting ││                      │
//!                    └────────┬────────┘│                      │
//!                   watcher   ▼         ▼                      │
//!                    ┌──────────────────────┐                  │
//!                    │ payment-confirmation │──────────────────┘
//!                    └──────────────────────┘
//! ```
//!
//! Every view except `login` needs a session; `profile` is reachable from
//! anywhere once signed in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// A screen of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Login,
    Dashboard,
    Products,
    NewSale,
    PaymentMethod,
    PaymentWaiting,
    PaymentConfirmation,
    SalesHistory,
    Profile,
}

impl View {
    pub const ALL: [View; 9] = [
        View::Login,
        View::Dashboard,
        View::Products,
        View::NewSale,
        View::PaymentMethod,
        View::PaymentWaiting,
        View::PaymentConfirmation,
        View::SalesHistory,
        View::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::Dashboard => "dashboard",
            View::Products => "products",
            View::NewSale => "new-sale",
            View::PaymentMethod => "payment-method",
            View::PaymentWaiting => "payment-waiting",
            View::PaymentConfirmation => "payment-confirmation",
            View::SalesHistory => "sales-history",
            View::Profile => "profile",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, View::Login)
    }

    /// Views that show the sale created by the last checkout.
    pub fn requires_sale(&self) -> bool {
        matches!(self, View::PaymentWaiting | View::PaymentConfirmation)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| CoreError::NavigationDenied {
                to: s.to_string(),
                reason: "unknown view".to_string(),
            })
    }
}

// =============================================================================
// Navigation Guards
// =============================================================================

/// What the guards need to know about the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationContext {
    pub authenticated: bool,
    pub cart_total: Money,
    /// A sale id is held from the last checkout.
    pub has_sale: bool,
    /// The held sale is `PAID`.
    pub sale_paid: bool,
}

/// Checks whether `to` may be entered.
///
/// ## Rules
/// - Anything but `login` needs a session
/// - `payment-method` needs a cart total above zero
/// - `payment-waiting` / `payment-confirmation` need a sale from checkout
/// - `payment-waiting` only while that sale is unpaid
/// - `payment-confirmation` only once it is paid; the watcher or a cash
///   checkout gets there, never a caller ahead of the payment
pub fn check_navigation(to: View, ctx: &NavigationContext) -> CoreResult<()> {
    let deny = |reason: &str| {
        Err(CoreError::NavigationDenied {
            to: to.to_string(),
            reason: reason.to_string(),
        })
    };

    if to.requires_session() && !ctx.authenticated {
        return deny("sign in first");
    }
    if to == View::PaymentMethod && !ctx.cart_total.is_positive() {
        return deny("cart is empty");
    }
    if to.requires_sale() && !ctx.has_sale {
        return deny("no sale in progress");
    }
    if to == View::PaymentWaiting && ctx.sale_paid {
        return deny("sale is already paid");
    }
    if to == View::PaymentConfirmation && !ctx.sale_paid {
        return deny("payment not confirmed yet");
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
