//! # storefront-core: Pure Domain Logic for the Storefront Client
//!
//! Money, wire records, the shopping cart and form validation. Nothing in
//! this crate touches the network, the file system or a clock other than
//! `Utc::now()` for cart timestamps.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Client Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    storefront-cli                               │   │
//! │  │    products ──► order ──► orders ──► admin create-product       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront-client                            │   │
//! │  │    SessionStore, CartStore, AsyncResource, Checkout, Admin      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   forms   │  │   │
//! │  │   │  Orders   │  │ discounts │  │ CartItem  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO ASYNC                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{Cart, CartItem, Money};
//!
//! let mut cart = Cart::new();
//! let mug = CartItem {
//!     id: 1,
//!     name: "Mug".into(),
//!     price: Money::from_major(120),
//!     image: String::new(),
//!     quantity: 1,
//! };
//!
//! cart.add(mug.clone());
//! cart.add(mug);
//! assert_eq!(cart.total(), Money::from_major(240));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use error::ValidationError;
pub use money::Money;
pub use types::*;
