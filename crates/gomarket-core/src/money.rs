//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The mobile UI and the persisted cart speak in JSON numbers:            │
//! │    { "price": 19.9 }                                                    │
//! │                                                                         │
//! │  Summing floats drifts:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents inside, JSON numbers at the edge           │
//! │    19.9 ──(deserialize)──► 1990 cents ──(math)──► 3980 cents            │
//! │    3980 cents ──(serialize)──► 39.8                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.cents(), 3297);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::error::{CoreError, CoreResult};

/// Number of minor units in one major unit (cents per dollar).
const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Wire Format
/// `Money` serializes as a JSON number in **major** units so the persisted
/// cart stays readable by the mobile UI (`1990` cents ⇄ `19.9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use gomarket_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit amount (e.g. `19.9`) into cents.
    ///
    /// Rounds to the nearest cent. Only used at the JSON boundary.
    ///
    /// ## Errors
    /// `CoreError::InvalidAmount` for NaN, infinities, or values that do not
    /// fit in `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use gomarket_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_units(19.9).unwrap().cents(), 1990);
    /// assert!(Money::from_major_units(f64::NAN).is_err());
    /// ```
    pub fn from_major_units(amount: f64) -> CoreResult<Self> {
        if !amount.is_finite() {
            return Err(CoreError::InvalidAmount {
                reason: format!("{amount} is not a finite number"),
            });
        }

        let cents = (amount * MINOR_PER_MAJOR as f64).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return Err(CoreError::InvalidAmount {
                reason: format!("{amount} is out of range"),
            });
        }

        Ok(Money(cents as i64))
    }

    /// Like [`Money::from_major_units`], but refuses amounts that are not a
    /// whole number of cents.
    ///
    /// The result always converts back to exactly `amount`, so reading a
    /// stored price and writing it again never changes it.
    ///
    /// ```rust
    /// use gomarket_core::money::Money;
    ///
    /// assert_eq!(Money::from_exact_major_units(10.99).unwrap().cents(), 1099);
    /// assert!(Money::from_exact_major_units(10.999).is_err());
    /// ```
    pub fn from_exact_major_units(amount: f64) -> CoreResult<Self> {
        let money = Self::from_major_units(amount)?;
        if money.to_major_units() != amount {
            return Err(CoreError::InvalidAmount {
                reason: format!("{amount} is not a whole number of cents"),
            });
        }
        Ok(money)
    }

    /// Returns the amount in major units, for the JSON boundary only.
    #[inline]
    pub fn to_major_units(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a line quantity.
    ///
    /// Saturates instead of overflowing; a cart total never wraps around.
    ///
    /// ## Example
    /// ```rust
    /// use gomarket_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display for logs and debugging. The UI does its own localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}${}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major_units())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_exact_major_units(amount).map_err(D::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
