//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Stored, summed and compared as i64 cents                             │
//! │    Converted to/from Decimal only at the JSON boundary                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//! use stockbook_core::quantity::Quantity;
//!
//! let price: Money = "10.00".parse().unwrap();
//! let line = price.times_quantity(Quantity::from_units(3)).unwrap();
//! assert_eq!(line.to_string(), "30.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::quantity::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: net cash flow and discounts can be negative
/// - **Serialized as a decimal string**: `"10.00"`, so callers never hand us
///   a float
/// - **Stored as INTEGER** in SQLite through the transparent sqlx derive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(try_from = "Decimal", into = "Decimal")]
#[ts(export)]
pub struct Money(#[ts(type = "string")] i64);

impl Money {
    /// Number of fractional digits carried by a Money value.
    pub const SCALE: u32 = 2;

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the exact decimal representation (`1099` → `10.99`).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, Self::SCALE)
    }

    /// Converts a decimal amount into Money.
    ///
    /// Values with more than two fractional digits are rejected rather than
    /// silently rounded: `"10.005"` is an input error, `"10.50"` is fine.
    pub fn from_decimal(value: Decimal) -> Result<Self, ValidationError> {
        let normalized = value.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("{} has more than {} decimal places", value, Self::SCALE),
            });
        }

        (normalized * Decimal::ONE_HUNDRED)
            .to_i64()
            .map(Money)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("{} is out of range", value),
            })
    }

    /// Multiplies a unit price by a (possibly fractional) quantity.
    ///
    /// ## Rounding
    /// The exact product is rounded to cents with banker's rounding
    /// (half to even), so `0.125 kg × 0.10` gives `0.01`, not `0.02`.
    ///
    /// ```text
    /// unit price 12.99 × 0.250 kg = 3.2475 → 3.25
    /// unit price 10.00 × 3.000    = 30.0000 → 30.00
    /// ```
    ///
    /// Returns `None` on overflow.
    pub fn times_quantity(&self, quantity: Quantity) -> Option<Money> {
        let exact = self.to_decimal().checked_mul(quantity.to_decimal())?;
        let rounded =
            exact.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven);
        Money::from_decimal(rounded).ok()
    }

    /// Adds, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts, returning `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums the values, returning `None` as soon as the total overflows.
    pub fn checked_sum(values: impl IntoIterator<Item = Money>) -> Option<Self> {
        values
            .into_iter()
            .try_fold(Money::zero(), |total, value| total.checked_add(value))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`30.00`, `-5.50`); currency symbols belong to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: e.to_string(),
        })?;
        Money::from_decimal(value)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.to_decimal()
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.to_decimal(), Decimal::new(1099, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("10.00".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("7".parse::<Money>().unwrap().cents(), 700);
        assert_eq!("-2.25".parse::<Money>().unwrap().cents(), -225);
        assert_eq!("10.500".parse::<Money>().unwrap().cents(), 1050);

        assert!("10.005".parse::<Money>().is_err());
        assert!("ten".parse::<Money>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_typescript_binding_matches_json() {
        assert_eq!(Money::inline(), "string");
        assert_eq!(serde_json::to_value(Money::from_cents(300)).unwrap(), "3.00");
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_cents(i64::MAX);
        let one = Money::from_cents(1);

        assert_eq!(max.checked_add(one), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(one), None);
        assert_eq!(one.checked_sub(max), Some(Money::from_cents(1 - i64::MAX)));

        assert_eq!(
            Money::checked_sum([Money::from_cents(250), Money::from_cents(750)]),
            Some(Money::from_cents(1_000))
        );
        assert_eq!(Money::checked_sum([max, one, -one]), None);
        assert_eq!(Money::checked_sum(std::iter::empty()), Some(Money::zero()));
    }

    #[test]
    fn test_times_whole_quantity() {
        let price = Money::from_cents(1000);
        let line = price.times_quantity(Quantity::from_units(3)).unwrap();
        assert_eq!(line.cents(), 3000);
    }

    #[test]
    fn test_times_fractional_quantity_rounds_half_even() {
        // 12.99 × 0.250 = 3.2475 → 3.25
        let price = Money::from_cents(1299);
        let line = price.times_quantity(Quantity::from_milli(250)).unwrap();
        assert_eq!(line.cents(), 325);

        // 0.10 × 0.125 = 0.0125 → 0.01 (half to even)
        let price = Money::from_cents(10);
        let line = price.times_quantity(Quantity::from_milli(125)).unwrap();
        assert_eq!(line.cents(), 1);

        // 0.10 × 0.375 = 0.0375 → 0.04
        let line = price.times_quantity(Quantity::from_milli(375)).unwrap();
        assert_eq!(line.cents(), 4);
    }

    #[test]
    fn test_serde_uses_decimal_strings() {
        let json = serde_json::to_string(&Money::from_cents(3000)).unwrap();
        assert_eq!(json, "\"30.00\"");

        let parsed: Money = serde_json::from_str("\"10.00\"").unwrap();
        assert_eq!(parsed.cents(), 1000);

        assert!(serde_json::from_str::<Money>("\"1.234\"").is_err());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
