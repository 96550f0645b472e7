//! # Cart
//!
//! The shopping cart: an insertion-ordered set of lines keyed by product id.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Shopper Action           Cart Method            Effect                 │
//! │  ──────────────           ───────────            ──────                 │
//! │                                                                         │
//! │  Click "Add" ────────────► add() ───────────────► qty += 1 or push     │
//! │                                                                         │
//! │  Change Quantity ────────► update_quantity() ──► qty = n (n < 1: drop) │
//! │                                                                         │
//! │  Click Remove ───────────► remove() ────────────► retain(id != x)      │
//! │                                                                         │
//! │  Order placed ───────────► clear() ─────────────► items.clear()        │
//! │                                                                         │
//! │  View Cart ──────────────► total() ─────────────► Σ price × qty        │
//! │                                                                         │
//! │  NOTE: every operation is total. Unknown ids are ignored, never errors. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{OrderLine, Product};

/// A line in the shopping cart.
///
/// ## Price Freezing
/// `price` is the unit price the shopper saw when adding the product, with
/// any markdown already applied. The cart never recomputes discounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product id; unique within a cart.
    pub id: i64,

    pub name: String,

    /// Discount-adjusted unit price.
    pub price: Money,

    /// Image reference (may be empty).
    pub image: String,

    /// Always at least 1 while the item is in a cart.
    pub quantity: i64,
}

impl CartItem {
    /// Builds a cart line from a catalog product, freezing the marked-down price.
    pub fn from_product(product: &Product) -> Self {
        CartItem {
            id: product.id,
            name: product.name.clone(),
            price: product.unit_price(),
            image: product.primary_image().to_string(),
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same product increases quantity)
/// - Every quantity is >= 1 (an update below 1 removes the item)
/// - `total()` is derived from `items` on every call, never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,

    /// When the cart was created or last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of `item`.
    ///
    /// ## Behavior
    /// - Already in cart: quantity goes up by exactly 1
    /// - Not in cart: appended with quantity 1, whatever `item.quantity` says
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return;
        }

        self.items.push(CartItem { quantity: 1, ..item });
    }

    /// Removes the line for `id`. Missing ids are a no-op.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: i64) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != initial_len
    }

    /// Sets the quantity of `id`.
    ///
    /// ## Behavior
    /// - `quantity < 1`: same as [`Cart::remove`]
    /// - Product not in cart: no-op
    /// - No upper bound; stock limits are checked elsewhere
    pub fn update_quantity(&mut self, id: i64, quantity: i64) {
        if quantity < 1 {
            self.remove(id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns the number of unique items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Σ price × quantity, recomputed from the current lines. Quantities
    /// are unbounded, so the sum clamps at [`Money::MAX`].
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// The `items` array of an order submission.
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|i| OrderLine {
                product_id: i.id,
                quantity: i.quantity,
            })
            .collect()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
