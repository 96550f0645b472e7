//! # Validation Module
//!
//! Client-side form checks, run before any request is sent.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (this module)                                            │
//! │  ├── Required fields present and not blank                             │
//! │  ├── Numeric ranges (price, stock, discount)                           │
//! │  └── Obvious format errors (email without '@')                         │
//! │                                                                         │
//! │  Layer 2: Backend                                                       │
//! │  ├── Credential checks                                                 │
//! │  ├── Uniqueness (email, username)                                      │
//! │  └── Stock availability                                                │
//! │                                                                         │
//! │  A form that fails Layer 1 never reaches the network.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewProduct, ProductPatch, Registration, ShippingDetails};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest markdown a product may carry, in percent.
pub const MAX_DISCOUNT_PERCENT: u32 = 100;

// =============================================================================
// Field Validators
// =============================================================================

/// Fails with `Required` when `value` is empty or only whitespace.
pub fn require(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Required
/// - Must contain `@`
///
/// Anything stricter is left to the backend.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    require("email", email)?;

    if !email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "must contain '@'",
        });
    }

    Ok(())
}

/// Validates a discount percentage (0..=100).
pub fn validate_discount(discount: u32) -> ValidationResult<()> {
    if discount > MAX_DISCOUNT_PERCENT {
        return Err(ValidationError::OutOfRange {
            field: "discount",
            min: 0,
            max: i64::from(MAX_DISCOUNT_PERCENT),
        });
    }
    Ok(())
}

/// Validates a stock count (>= 0).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock",
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a quantity typed by the shopper.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Login form: identifier and secret are both required.
pub fn validate_login(identifier: &str, secret: &str) -> ValidationResult<()> {
    require("identifier", identifier)?;
    require("secret", secret)
}

/// Admin login form: username and password are both required.
pub fn validate_admin_login(username: &str, password: &str) -> ValidationResult<()> {
    require("username", username)?;
    require("password", password)
}

/// Sign-up form.
///
/// ## Rules
/// - email: required, contains `@`
/// - password: required
pub fn validate_registration(form: &Registration) -> ValidationResult<()> {
    validate_email(&form.email)?;
    require("password", &form.password)
}

/// Checkout delivery form; every field is required.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Checkout: Place Order                                                  │
/// │                                                                         │
/// │  Shopper fills name / address / phone                                  │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_shipping() ← THIS FUNCTION                                   │
/// │       │                                                                 │
/// │       ├── any blank? → Error: "<field> is required"                    │
/// │       │                                                                 │
/// │       └── OK → POST /orders                                            │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_shipping(shipping: &ShippingDetails) -> ValidationResult<()> {
    require("name", &shipping.name)?;
    require("address", &shipping.address)?;
    require("phone", &shipping.phone)
}

/// Admin product creation form.
///
/// ## Rules
/// - name, colors, description: required
/// - price: > 0
/// - stock: >= 0
/// - discount: 0..=100
/// - category_id, brand_id: > 0 (a selection was made)
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    require("name", &product.name)?;

    if !product.price.is_positive() {
        return Err(ValidationError::MustBePositive { field: "price" });
    }

    validate_discount(product.discount)?;
    validate_stock(product.stock)?;
    require("colors", &product.colors)?;
    require("description", &product.description)?;

    if product.category_id <= 0 {
        return Err(ValidationError::Required { field: "category" });
    }
    if product.brand_id <= 0 {
        return Err(ValidationError::Required { field: "brand" });
    }

    Ok(())
}

/// Admin product update: only the fields being changed are checked.
pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        require("name", name)?;
    }
    if let Some(price) = patch.price {
        if !price.is_positive() {
            return Err(ValidationError::MustBePositive { field: "price" });
        }
    }
    if let Some(discount) = patch.discount {
        validate_discount(discount)?;
    }
    if let Some(stock) = patch.stock {
        validate_stock(stock)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
