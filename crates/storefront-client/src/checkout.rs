//! # Checkout
//!
//! Turns the cart into an order and reads back the order history.
//!
//! ```text
//! place_order(shipping)
//!     │
//!     ├── session not Authenticated ──► OrderError::NotAuthenticated
//!     ├── cart empty ─────────────────► OrderError::EmptyCart
//!     ├── shipping invalid ───────────► OrderError::Validation
//!     │
//!     ▼
//! POST /orders {items, shipping}  (session bearer)
//!     │
//!     ├── ok ──► cart cleared ──► OrderReceipt
//!     └── err ─► cart untouched ─► OrderError::Rejected / Transport
//! ```

use std::sync::Arc;

use serde::Serialize;
use storefront_core::validation::validate_shipping;
use storefront_core::{OrderLine, OrderReceipt, OrderSummary, ShippingDetails};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cart_store::CartStore;
use crate::error::{FetchError, OrderError};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, Auth};

#[derive(Debug, Serialize)]
struct OrderSubmission<'a> {
    items: Vec<OrderLine>,
    shipping: &'a ShippingDetails,
}

pub struct Checkout {
    api: ApiClient,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
}

impl Checkout {
    pub fn new(api: ApiClient, session: Arc<SessionStore>, cart: Arc<CartStore>) -> Self {
        Checkout { api, session, cart }
    }

    /// Submits the current cart. Nothing is sent unless the customer is
    /// signed in, the cart has items and the shipping form is complete.
    pub async fn place_order(&self, shipping: &ShippingDetails) -> Result<OrderReceipt, OrderError> {
        if !self.session.is_authenticated() {
            return Err(OrderError::NotAuthenticated);
        }
        let items = self.cart.order_lines();
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        validate_shipping(shipping)?;

        let submission = OrderSubmission { items, shipping };
        let request = ApiRequest::post_json("/orders", &submission)?.with_auth(Auth::Session);

        let receipt: OrderReceipt = match self.api.send_json(request).await {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(%err, "Order submission failed");
                return Err(err.into());
            }
        };

        self.cart.clear_cart();
        info!(invoice = %receipt.invoice, lines = submission.items.len(), "Order placed");
        Ok(receipt)
    }

    /// Past orders of the signed-in customer.
    pub async fn order_history(&self) -> Result<Vec<OrderSummary>, FetchError> {
        Ok(self.api.get_json("/orders").await?)
    }
}
