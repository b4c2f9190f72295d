//! # Cart
//!
//! The in-memory cart for the sale being built on the `new-sale` screen.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  Screen Action           Cart Call            Effect                    │
//! │  ─────────────           ─────────            ──────                    │
//! │                                                                         │
//! │  Tap product (+) ──────► add(&product) ─────► qty 0 → 1, or qty + 1    │
//! │                                               while qty < stock         │
//! │                                                                         │
//! │  Tap (−) ──────────────► remove(id) ────────► qty − 1, entry removed   │
//! │                                               when it reaches 0         │
//! │                                                                         │
//! │  Enter new-sale ───────► clear() ───────────► items.clear()            │
//! │                                                                         │
//! │  Footer total ─────────► total() ───────────► Σ unit_price × qty       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Entries are unique by `product_id`
//! - `1 <= quantity <= stock` of the product snapshot
//! - `total()` is recomputed from the entries on every call, never cached
//!
//! Rejected adds are reported through [`CartAdd`] rather than errors; the
//! screen decides whether to say anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::{PaymentMethod, Product, SaleLine};

// =============================================================================
// Cart Item
// =============================================================================

/// An entry in the cart.
///
/// Name, price and stock are frozen from the product when the entry is
/// created, so the footer total does not move if the catalog is edited
/// in the middle of a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Price in centavos at time of adding (frozen)
    pub unit_price_cents: i64,

    /// Stock observed when the product was last added; the quantity ceiling.
    pub stock: i64,

    /// Always at least 1.
    pub quantity: i64,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    fn from_product(product: &Product) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            stock: product.stock,
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit price × quantity
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// What `Cart::add` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartAdd {
    /// New entry with quantity 1.
    Added,
    /// Existing entry incremented.
    Incremented,
    /// Quantity already equals stock; nothing changed.
    AtStockLimit,
    /// Product has no stock. A cart entry for it, if any, was removed.
    OutOfStock,
    /// Stock fell below the quantity in the cart; quantity lowered to stock.
    Reduced,
}

impl CartAdd {
    pub fn changed(&self) -> bool {
        matches!(self, CartAdd::Added | CartAdd::Incremented | CartAdd::Reduced)
    }
}

/// What `Cart::remove` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartRemove {
    Decremented,
    /// Quantity was 1; the entry is gone.
    Removed,
    NotInCart,
}

// =============================================================================
// Cart
// =============================================================================

/// The cart of the sale in progress.
///
/// Besides the entries, the cart carries the checkout key sent with
/// `create_sale_transaction`. Any change to the entries discards it, so
/// retries of an unchanged cart reuse the key while an edited cart gets a
/// fresh one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    checkout_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            checkout_key: None,
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Not in cart, stock >= 1: inserted with quantity 1
    /// - Not in cart, stock < 1: no-op
    /// - In cart, quantity < stock: quantity + 1
    /// - In cart, quantity == stock: no-op
    ///
    /// The stock of `product` refreshes the entry's ceiling. If it dropped
    /// below the quantity in the cart, the entry is lowered to the new
    /// stock (`Reduced`) or removed when none is left (`OutOfStock`).
    pub fn add(&mut self, product: &Product) -> CartAdd {
        if let Some(index) = self.items.iter().position(|i| i.product_id == product.id) {
            let item = &mut self.items[index];
            item.stock = product.stock;
            if item.quantity > product.stock {
                self.checkout_key = None;
                if product.stock < 1 {
                    self.items.remove(index);
                    return CartAdd::OutOfStock;
                }
                item.quantity = product.stock;
                return CartAdd::Reduced;
            }
            if item.quantity == product.stock {
                return CartAdd::AtStockLimit;
            }
            item.quantity += 1;
            self.checkout_key = None;
            return CartAdd::Incremented;
        }

        if product.stock < 1 {
            return CartAdd::OutOfStock;
        }

        self.items.push(CartItem::from_product(product));
        self.checkout_key = None;
        CartAdd::Added
    }

    /// Removes one unit of the product. An entry at quantity 1 is deleted.
    pub fn remove(&mut self, product_id: &str) -> CartRemove {
        let Some(index) = self.items.iter().position(|i| i.product_id == product_id) else {
            return CartRemove::NotInCart;
        };

        self.checkout_key = None;
        if self.items[index].quantity > 1 {
            self.items[index].quantity -= 1;
            CartRemove::Decremented
        } else {
            self.items.remove(index);
            CartRemove::Removed
        }
    }

    /// Empties the cart and forgets the checkout key.
    pub fn clear(&mut self) {
        self.items.clear();
        self.checkout_key = None;
        self.created_at = Utc::now();
    }

    /// Σ unit price × quantity over the current entries.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map_or(0, |i| i.quantity)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Line-item batch for `create_sale_transaction`, in cart order.
    pub fn sale_lines(&self) -> Vec<SaleLine> {
        self.items
            .iter()
            .map(|item| SaleLine {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                line_total_cents: item.line_total().cents(),
                product_name: item.name.clone(),
            })
            .collect()
    }

    /// Returns the key for checking out the current entries with `method`.
    ///
    /// Stable until the entries change or the cart is cleared. Each payment
    /// method gets its own key, so switching from PIX to cash is a new sale
    /// rather than a replay of the pending one.
    pub fn checkout_key(&mut self, method: PaymentMethod) -> String {
        let base = self
            .checkout_key
            .get_or_insert_with(|| Uuid::new_v4().to_string());
        format!("{}-{}", base, method.code())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// Cart summary returned to the screens after every cart command.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub items: Vec<CartItem>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            items: cart.items.clone(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total_cents: cart.total().cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            name: name.to_string(),
            description: None,
            price_cents,
            stock,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_stops_at_stock() {
        for stock in 1..=5 {
            let mut cart = Cart::new();
            let p = product("p1", "Pomada", 2500, stock);

            for _ in 0..=stock {
                cart.add(&p);
            }

            assert_eq!(cart.quantity_of("p1"), stock);
            assert_eq!(cart.item_count(), 1);
        }
    }

    #[test]
    fn test_add_reports_outcome() {
        let mut cart = Cart::new();
        let p = product("p1", "Barba", 3000, 2);

        assert_eq!(cart.add(&p), CartAdd::Added);
        assert_eq!(cart.add(&p), CartAdd::Incremented);
        assert_eq!(cart.add(&p), CartAdd::AtStockLimit);
        assert!(!CartAdd::AtStockLimit.changed());
    }

    #[test]
    fn test_add_out_of_stock_is_noop() {
        let mut cart = Cart::new();
        let p = product("p1", "Barba", 3000, 0);

        assert_eq!(cart.add(&p), CartAdd::OutOfStock);
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_lower_stock_caps_existing_entry() {
        let mut cart = Cart::new();
        let mut p = product("p1", "Barba", 3000, 5);
        cart.add(&p);
        cart.add(&p);

        p.stock = 2;
        assert_eq!(cart.add(&p), CartAdd::AtStockLimit);
        assert_eq!(cart.quantity_of("p1"), 2);
    }

    #[test]
    fn test_stock_below_quantity_lowers_entry() {
        let mut cart = Cart::new();
        let mut p = product("p1", "Barba", 3000, 5);
        for _ in 0..4 {
            cart.add(&p);
        }
        let key = cart.checkout_key(PaymentMethod::Cash);

        p.stock = 2;
        assert_eq!(cart.add(&p), CartAdd::Reduced);
        assert_eq!(cart.quantity_of("p1"), 2);
        assert_eq!(cart.items()[0].stock, 2);
        assert_eq!(cart.total().cents(), 6000);
        assert_ne!(cart.checkout_key(PaymentMethod::Cash), key);

        p.stock = 0;
        assert_eq!(cart.add(&p), CartAdd::OutOfStock);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_at_quantity_one_deletes_entry() {
        let mut cart = Cart::new();
        let p = product("p1", "Barba", 3000, 3);
        cart.add(&p);

        assert_eq!(cart.remove("p1"), CartRemove::Removed);
        assert!(cart.items().iter().all(|i| i.product_id != "p1"));
        assert_eq!(cart.remove("p1"), CartRemove::NotInCart);
    }

    #[test]
    fn test_remove_decrements() {
        let mut cart = Cart::new();
        let p = product("p1", "Barba", 3000, 3);
        cart.add(&p);
        cart.add(&p);

        assert_eq!(cart.remove("p1"), CartRemove::Decremented);
        assert_eq!(cart.quantity_of("p1"), 1);
    }

    #[test]
    fn test_total_follows_entries() {
        let mut cart = Cart::new();
        let corte = product("p1", "Corte de Cabelo", 4000, 10);
        let barba = product("p2", "Barba", 3000, 10);

        cart.add(&corte);
        cart.add(&corte);
        cart.add(&barba);
        assert_eq!(cart.total().cents(), 11000);

        cart.add(&barba);
        cart.remove("p2");
        cart.remove("p1");
        cart.add(&corte);
        assert_eq!(cart.total().cents(), 11000);

        let expected: i64 = cart
            .items()
            .iter()
            .map(|i| i.unit_price_cents * i.quantity)
            .sum();
        assert_eq!(cart.total().cents(), expected);
    }

    #[test]
    fn test_sale_lines_snapshot() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "Corte de Cabelo", 4000, 10));
        cart.add(&product("p1", "Corte de Cabelo", 4000, 10));
        cart.add(&product("p2", "Barba", 3000, 10));

        let lines = cart.sale_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_name, "Corte de Cabelo");
        assert_eq!(lines[0].line_total_cents, 8000);
        assert_eq!(lines[1].line_total_cents, 3000);
    }

    #[test]
    fn test_checkout_key_lifecycle() {
        let mut cart = Cart::new();
        let p = product("p1", "Barba", 3000, 5);
        cart.add(&p);

        let first = cart.checkout_key(PaymentMethod::Pix);
        assert_eq!(cart.checkout_key(PaymentMethod::Pix), first);
        assert_ne!(cart.checkout_key(PaymentMethod::Cash), first);

        cart.add(&p);
        let second = cart.checkout_key(PaymentMethod::Pix);
        assert_ne!(second, first);

        cart.clear();
        assert_ne!(cart.checkout_key(PaymentMethod::Pix), second);
    }
}
