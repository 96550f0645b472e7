//! # Cart Store
//!
//! Observable wrapper around [`storefront_core::Cart`].
//!
//! ## Thread Safety
//! The cart lives inside a `tokio::sync::watch` sender:
//! 1. Mutations go through `send_modify`, one at a time
//! 2. Readers get a cheap snapshot or a `Receiver` to follow changes
//! 3. No I/O happens here, so nothing can fail halfway
//!
//! ```text
//! add_to_cart / remove_from_cart / update_quantity / clear_cart
//!          │
//!          ▼
//!   watch::Sender<Cart> ──► subscribers (cart badge, checkout view, ...)
//!          │
//!          ▼
//!   total() = Σ price × quantity, recomputed on every read
//! ```

use storefront_core::{Cart, CartItem, Money, OrderLine};
use tokio::sync::watch;
use tracing::debug;

/// The shopping cart for the running client.
pub struct CartStore {
    cart: watch::Sender<Cart>,
}

impl CartStore {
    pub fn new() -> Self {
        let (cart, _) = watch::channel(Cart::new());
        CartStore { cart }
    }

    /// Adds one unit; a product already in the cart just gets +1.
    pub fn add_to_cart(&self, item: CartItem) {
        debug!(product_id = item.id, "Add to cart");
        self.cart.send_modify(|cart| cart.add(item));
    }

    /// No-op for ids not in the cart.
    pub fn remove_from_cart(&self, id: i64) {
        self.cart.send_if_modified(|cart| cart.remove(id));
    }

    /// Quantities below 1 remove the line.
    pub fn update_quantity(&self, id: i64, quantity: i64) {
        debug!(product_id = id, quantity, "Update cart quantity");
        self.cart.send_modify(|cart| cart.update_quantity(id, quantity));
    }

    pub fn clear_cart(&self) {
        self.cart.send_modify(Cart::clear);
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.cart.borrow().items().to_vec()
    }

    pub fn total(&self) -> Money {
        self.cart.borrow().total()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.borrow().is_empty()
    }

    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.cart.borrow().order_lines()
    }

    pub fn snapshot(&self) -> Cart {
        self.cart.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
