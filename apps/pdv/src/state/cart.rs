//! # Cart State
//!
//! The cart of the sale in progress, shared by the cart, navigation and
//! sale commands.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Screen Action            Command                 Cart State Change     │
//! │  ─────────────            ───────                 ─────────────────     │
//! │                                                                         │
//! │  Tap product ────────────► add_to_cart() ───────► qty + 1 (≤ stock)    │
//! │                                                                         │
//! │  Tap minus ──────────────► remove_from_cart() ──► qty - 1 / removed    │
//! │                                                                         │
//! │  Open new-sale ──────────► navigate() ──────────► clear()              │
//! │                                                                         │
//! │  Finalize ───────────────► create_sale() ───────► (read + checkout key)│
//! │                                                                         │
//! │  Sign out ───────────────► sign_out() ──────────► clear()              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use raiz_core::Cart;

/// Cart behind `Arc<Mutex<_>>`; every access is short and synchronous.
#[derive(Debug, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = ctx.cart.with_cart(|c| CartTotals::from(c));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    pub fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }
}
