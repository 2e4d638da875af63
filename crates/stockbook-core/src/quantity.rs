//! # Quantity Module
//!
//! Fixed-precision stock quantities.
//!
//! Stock can be counted in whole units (cans, boxes) or measured (kg, litres),
//! so quantities carry three fractional digits. Internally a `Quantity` is an
//! `i64` count of thousandths:
//!
//! ```text
//! ┌──────────────┬──────────────┐
//! │ Decimal      │ milli (i64)  │
//! ├──────────────┼──────────────┤
//! │ 5            │ 5000         │
//! │ 0.250        │ 250          │
//! │ -3.000       │ -3000        │
//! └──────────────┴──────────────┘
//! ```
//!
//! Stored quantities (product stock, movement magnitudes) are never
//! negative; signed quantities only appear in adjustment requests.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// A stock quantity with three decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(try_from = "Decimal", into = "Decimal")]
#[ts(export)]
pub struct Quantity(#[ts(type = "string")] i64);

impl Quantity {
    /// Number of fractional digits carried by a Quantity.
    pub const SCALE: u32 = 3;

    const MILLI_PER_UNIT: i64 = 1000;

    /// Creates a quantity from thousandths of a unit.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * Self::MILLI_PER_UNIT)
    }

    /// Returns the raw count of thousandths.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.abs())
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Quantity)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Quantity)
    }

    pub const fn saturating_add(self, other: Self) -> Self {
        Quantity(self.0.saturating_add(other.0))
    }

    /// Returns the exact decimal representation (`2500` → `2.500`).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, Self::SCALE)
    }

    /// Converts a decimal into a Quantity, rejecting more than three
    /// fractional digits.
    pub fn from_decimal(value: Decimal) -> Result<Self, ValidationError> {
        let normalized = value.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: format!("{} has more than {} decimal places", value, Self::SCALE),
            });
        }

        (normalized * Decimal::ONE_THOUSAND)
            .to_i64()
            .map(Quantity)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: format!("{} is out of range", value),
            })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: e.to_string(),
        })?;
        Quantity::from_decimal(value)
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Quantity::from_decimal(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(quantity: Quantity) -> Self {
        quantity.to_decimal()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}
