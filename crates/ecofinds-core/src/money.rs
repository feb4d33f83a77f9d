//! # Money Module
//!
//! Provides the `Money` type for prices and order totals.
//!
//! ## Storage vs Wire
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE MONEY LIVES                                                      │
//! │                                                                         │
//! │  Client JSON        "price": "20.00"  or  "price": 20  or  20.5         │
//! │       │                                                                 │
//! │       ▼  Deserialize (at most two fractional digits)                    │
//! │  Money(2000)        integer cents, never a float                        │
//! │       │                                                                 │
//! │       ▼  sqlx (transparent)                                             │
//! │  products.price_cents INTEGER / orders.total_cents INTEGER              │
//! │       │                                                                 │
//! │       ▼  Serialize                                                      │
//! │  Response JSON      "total_amount": "20.00"                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON numbers are routed through their shortest decimal rendering before
//! parsing, so `19.99` becomes 1999 cents exactly.
//!
//! ## Usage
//! ```rust
//! use ecofinds_core::money::Money;
//!
//! let price: Money = "12.5".parse().unwrap();
//! assert_eq!(price.cents(), 1250);
//! assert_eq!(price.to_string(), "12.50");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// Signed so that arithmetic never wraps silently, but every price that
/// reaches the store has passed [`crate::validation::validate_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use ecofinds_core::money::Money;
    ///
    /// let price = Money::from_cents(2000); // 20.00
    /// assert_eq!(price.cents(), 2000);
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

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

// =============================================================================
// Parsing
// =============================================================================

fn invalid(reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: reason.to_string(),
    }
}

/// Parses a non-negative decimal with at most two fractional digits.
///
/// ## Accepted
/// `"20"`, `"20.5"`, `"20.50"`, `" 7.05 "`
///
/// ## Rejected
/// `""`, `"-1"`, `"20."`, `".5"`, `"1.005"`, `"1e3"`, `"abc"`
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid("must not be empty"));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => {
                if frac.is_empty() {
                    return Err(invalid("missing digits after decimal point"));
                }
                (whole, frac)
            }
            None => (s, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must be a non-negative decimal number"));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must be a non-negative decimal number"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most two decimal places allowed"));
        }

        let whole: i64 = whole.parse().map_err(|_| invalid("amount is too large"))?;
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid("bad fraction"))?,
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .map(Money)
            .ok_or_else(|| invalid("amount is too large"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as a plain two-decimal string ("20.00"). This is also the wire
/// format, so it carries no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a string or number with at most two decimal places")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be finite"));
        }
        // Display for f64 yields the shortest round-tripping decimal.
        v.to_string().parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
