//! # Money Module
//!
//! Provides the `Money` type for handling prices safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend sends prices as JSON numbers in major units:              │
//! │    "price": 1999.9                                                     │
//! │                                                                         │
//! │  Summing floats across a cart drifts:                                  │
//! │    0.1 + 0.2 = 0.30000000000000004                                     │
//! │                                                                         │
//! │  OUR SOLUTION: convert ONCE at the wire boundary into integer minor    │
//! │  units (kopecks / cents) and do every cart calculation in i64.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(129_900); // 1299.00
//! let line = price * 3;
//! assert_eq!(line.cents(), 389_700);
//!
//! // 15% off, rounded to whole major units like the catalog shows it
//! assert_eq!(price.apply_discount_percent(15).cents(), 110_400);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// Product.price (wire, major units f64)
///      │  from_major_f64 (once)
///      ▼
/// Money ──► apply_discount_percent ──► CartItem.price ──► Cart::total()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Converts a wire price (major units, possibly fractional) into `Money`.
    ///
    /// Rounds half away from zero to the nearest minor unit. Non-finite input
    /// becomes zero.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(1999.9).cents(), 199_990);
    /// assert_eq!(Money::from_major_f64(0.005).cents(), 1);
    /// ```
    pub fn from_major_f64(major: f64) -> Self {
        if !major.is_finite() {
            return Money::zero();
        }
        Money((major * 100.0).round() as i64)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in major units for the wire.
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Whole major units (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Minor part, always 0-99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Largest representable amount; sums and products clamp here.
    pub const MAX: Money = Money(i64::MAX);

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Applies a percentage markdown and rounds to whole major units.
    ///
    /// ## Rounding Rule
    /// The catalog has always shown discounted prices as
    /// `round(price × (100 − discount) / 100)` in whole major units, half
    /// rounding up. A zero discount returns the price untouched (no rounding).
    /// Discounts above 100 are clamped to 100.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_major(999);
    /// // 999 × 0.85 = 849.15 → 849
    /// assert_eq!(price.apply_discount_percent(15), Money::from_major(849));
    /// assert_eq!(Money::from_cents(12_345).apply_discount_percent(0).cents(), 12_345);
    /// ```
    pub fn apply_discount_percent(&self, percent: u8) -> Money {
        if percent == 0 {
            return *self;
        }
        let keep = 100 - i128::from(percent.min(100));
        // numerator is in units of 1/10000 of a major unit
        let numerator = i128::from(self.0) * keep;
        let major = if numerator >= 0 {
            (numerator + 5_000) / 10_000
        } else {
            (numerator - 5_000) / 10_000
        };
        Money((major * 100) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows `major.minor` without a currency symbol; the UI decides on symbols.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Serde adapter for fields that travel as JSON numbers in major units.
///
/// ```rust,ignore
/// #[serde(with = "crate::money::major_units")]
/// pub price: Money,
/// ```
pub mod major_units {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_major_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Ok(Money::from_major_f64(raw))
    }
}

/// Same as [`major_units`] for optional fields (`null` / absent → `None`).
pub mod major_units_opt {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Money>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(money) => serializer.serialize_some(&money.to_major_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(raw.map(Money::from_major_f64))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_f64_rounds_to_minor_unit() {
        assert_eq!(Money::from_major_f64(10.99).cents(), 1099);
        assert_eq!(Money::from_major_f64(1500.0).cents(), 150_000);
        assert_eq!(Money::from_major_f64(f64::NAN), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let price = Money::from_cents(100);
        assert_eq!(price * (i64::MAX / 10), Money::MAX);
        assert_eq!(Money::MAX + price, Money::MAX);
        assert_eq!(Money::from_cents(i64::MIN) - price, Money::from_cents(i64::MIN));

        let total: Money = vec![Money::MAX, price].into_iter().sum();
        assert_eq!(total, Money::MAX);
    }

    #[test]
    fn test_discount_rounds_to_whole_major_units() {
        // 1000 × 0.67 = 670 exactly
        assert_eq!(
            Money::from_major(1000).apply_discount_percent(33),
            Money::from_major(670)
        );
        // 999 × 0.5 = 499.5 → 500 (half rounds up)
        assert_eq!(
            Money::from_major(999).apply_discount_percent(50),
            Money::from_major(500)
        );
    }

    #[test]
    fn test_discount_edge_values() {
        let price = Money::from_cents(12_345);
        assert_eq!(price.apply_discount_percent(0), price);
        assert_eq!(price.apply_discount_percent(100), Money::zero());
        assert_eq!(price.apply_discount_percent(250), Money::zero());
    }

    #[test]
    fn test_major_units_serde_adapter() {
        #[derive(Serialize, Deserialize)]
        struct Wire {
            #[serde(with = "major_units")]
            price: Money,
        }

        let wire: Wire = serde_json::from_str(r#"{"price": 249.5}"#).unwrap();
        assert_eq!(wire.price.cents(), 24_950);

        let json = serde_json::to_string(&Wire { price: Money::from_cents(1050) }).unwrap();
        assert_eq!(json, r#"{"price":10.5}"#);
    }
}
