//! Unit price representation using decimal arithmetic.
//!
//! Prices are opaque to the cart: no currency, no rounding rules. They are
//! stored as decimals so that cart totals do not accumulate float error, and
//! persisted as plain JSON numbers carrying every digit of the decimal.
//!
//! Arithmetic saturates at the bounds of [`Decimal`] instead of panicking.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit or line price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in the smallest currency unit.
    ///
    /// ```rust
    /// use go_marketplace_core::Price;
    ///
    /// assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
    /// ```
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

/// Formats as a dollar amount with two decimals (e.g., `$19.99`).
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl core::str::FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('$').parse::<Decimal>().map(Self)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(
            self.0
                .checked_add(rhs.0)
                .unwrap_or_else(|| saturated(rhs.0.is_sign_negative())),
        )
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or_else(|| saturated(self.0.is_sign_negative())),
        )
    }
}

const fn saturated(negative: bool) -> Decimal {
    if negative { Decimal::MIN } else { Decimal::MAX }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::new(Decimal::from(10)).to_string(), "$10.00");
        assert_eq!(Price::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn test_parse_with_and_without_symbol() {
        assert_eq!("19.99".parse::<Price>().ok(), Some(Price::from_cents(1999)));
        assert_eq!("$19.99".parse::<Price>().ok(), Some(Price::from_cents(1999)));
        assert!("abc".parse::<Price>().is_err());
    }

    #[test]
    fn test_line_total() {
        assert_eq!(Price::from_cents(250) * 3, Price::from_cents(750));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Price::new(Decimal::MAX);
        assert_eq!(max * 2, max);
        assert_eq!(max + Price::from_cents(1), max);

        let min = Price::new(Decimal::MIN);
        assert_eq!(min * 3, min);
        assert_eq!(min + Price::from_cents(-1), min);

        assert_eq!([max, max].into_iter().sum::<Price>(), max);
    }

    #[test]
    fn test_json_keeps_every_digit() {
        for raw in ["19.99", "0.123456789012345678", "79228162514264337593543950335", "-0.5"] {
            let price: Price = raw.parse().unwrap();
            let json = serde_json::to_string(&price).unwrap();
            assert_eq!(json, raw);
            assert_eq!(serde_json::from_str::<Price>(&json).unwrap(), price);
        }
    }

    #[test]
    fn test_serializes_as_json_number() {
        let value = serde_json::to_value(Price::from_cents(1050)).unwrap_or_default();
        assert!(value.is_number());

        let parsed: Price = serde_json::from_str("10").unwrap_or_default();
        assert_eq!(parsed, Price::new(Decimal::from(10)));
    }
}
