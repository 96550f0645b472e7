//! # Domain Types
//!
//! Records exchanged with the storefront backend.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   UserProfile   │   │  OrderReceipt   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  invoice        │       │
//! │  │  price (Money)  │   │  name / email   │   │  status         │       │
//! │  │  discount (%)   │   │  username       │   └─────────────────┘       │
//! │  │  category/brand │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  Outbound forms: Registration, ShippingDetails, NewProduct, ProductPatch│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices travel as JSON numbers in major units and are converted to
//! [`Money`] on deserialization (see [`crate::money::major_units`]).

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::money::{self, Money};

// =============================================================================
// Catalog
// =============================================================================

/// A product category (also embedded in [`Product`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A product brand (also embedded in [`Product`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

/// A catalog product as returned by `/products` and `/products/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,

    pub name: String,

    /// List price before any markdown.
    #[serde(with = "money::major_units")]
    pub price: Money,

    /// Markdown in whole percent (0 = none).
    #[serde(default)]
    pub discount: u32,

    #[serde(default)]
    pub stock: i64,

    #[serde(default)]
    pub colors: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default)]
    pub brand: Option<Brand>,

    /// Up to three image references; missing uploads come through as `null`.
    #[serde(default)]
    pub images: Vec<Option<String>>,
}

impl Product {
    /// The price a shopper pays, markdown already applied.
    pub fn unit_price(&self) -> Money {
        let percent = self.discount.min(100) as u8;
        self.price.apply_discount_percent(percent)
    }

    /// Reference in the first image slot, or `""` when that slot is empty.
    pub fn primary_image(&self) -> &str {
        self.images
            .first()
            .and_then(|image| image.as_deref())
            .unwrap_or("")
    }

    pub fn is_discounted(&self) -> bool {
        self.discount > 0
    }
}

// =============================================================================
// Users
// =============================================================================

/// Profile record returned by `/auth/me` and `/auth/login`.
///
/// The two endpoints return slightly different field sets, so everything
/// except `id` is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

impl UserProfile {
    /// Best human-readable label: name, then username, then email.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("user #{}", self.id))
    }
}

/// Sign-up form sent to `/auth/register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,

    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<i64>,
}

impl Registration {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Registration {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Delivery details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// One line of an order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// Response to a successful `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub invoice: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub id: Option<i64>,
}

/// A product line frozen inside a past order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedProduct {
    pub name: String,

    #[serde(with = "money::major_units")]
    pub price: Money,

    #[serde(default)]
    pub discount: u32,

    pub quantity: i64,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub colors: Option<String>,
}

impl OrderedProduct {
    pub fn line_total(&self) -> Money {
        let percent = self.discount.min(100) as u8;
        self.price.apply_discount_percent(percent) * self.quantity
    }
}

/// An entry of `GET /orders` (order history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,

    pub invoice: String,

    #[serde(default)]
    pub status: Option<String>,

    pub date_created: NaiveDateTime,

    /// Keyed by product id (as a string, the way the backend stores it).
    #[serde(default)]
    pub orders: BTreeMap<String, OrderedProduct>,
}

impl OrderSummary {
    pub fn total(&self) -> Money {
        self.orders.values().map(OrderedProduct::line_total).sum()
    }
}

// =============================================================================
// Admin Forms
// =============================================================================

/// Product creation form for `POST /admin/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,

    #[serde(with = "money::major_units")]
    pub price: Money,

    #[serde(default)]
    pub discount: u32,

    pub stock: i64,

    pub colors: String,

    pub description: String,

    pub category_id: i64,

    pub brand_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_1: Option<String>,
}

/// Partial update for `PUT /admin/products/:id`; only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "money::major_units_opt"
    )]
    pub price: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProductPatch::default()
    }
}
