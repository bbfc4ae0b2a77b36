//! Type-safe money amounts using decimal arithmetic.
//!
//! Prices and payment amounts share one representation: a [`Decimal`]
//! rounded to two places. SQLite has no decimal column type, so the
//! database stores whole cents ([`Price::to_cents`] / [`Price::from_cents`]).
//! On the wire a price is a plain JSON number.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The value is neither a number nor a numeric string.
    #[error("price must be a number")]
    NotANumber,
    /// The value is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The value is zero where a positive amount is required.
    #[error("amount must be greater than zero")]
    NotPositive,
    /// The value does not fit a `NUMERIC(10, 2)` column.
    #[error("price must be at most {max}")]
    TooLarge {
        /// Largest accepted value.
        max: Decimal,
    },
}

/// A non-negative money amount with two decimal places.
///
/// ```
/// use serde_json::json;
/// use tiendita_core::Price;
///
/// let price = Price::from_json(&json!("19.999")).unwrap();
/// assert_eq!(price.to_string(), "20.00");
/// assert_eq!(price.to_cents(), 2000);
///
/// assert!(Price::from_json(&json!("abc")).is_err());
/// assert!(Price::from_json(&json!(-1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Largest accepted amount (`NUMERIC(10, 2)`).
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal, rounding to cents.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or larger than [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge { max: Self::MAX });
        }
        // Normalize -0.00 and keep a fixed scale for display.
        let mut amount = amount.abs();
        amount.rescale(2);
        Ok(Self(amount))
    }

    /// Parse a price from an arbitrary JSON value.
    ///
    /// Accepts JSON numbers and strings holding a decimal or scientific
    /// number. Booleans, `null`, arrays and objects are rejected.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` for non-numeric input and the
    /// [`Price::new`] errors for out-of-range values.
    pub fn from_json(value: &Value) -> Result<Self, PriceError> {
        let text = match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_owned(),
            _ => return Err(PriceError::NotANumber),
        };
        Self::from_str(&text)
    }

    /// Build a price from whole cents as stored in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if `cents` is negative or exceeds [`Price::MAX`].
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The amount in whole cents.
    #[must_use]
    pub fn to_cents(&self) -> i64 {
        // Bounded by MAX, so the multiplication always fits.
        (self.0 * Decimal::ONE_HUNDRED).to_i64().unwrap_or(i64::MAX)
    }

    /// Require a strictly positive amount (payments).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` for zero.
    pub fn require_positive(self) -> Result<Self, PriceError> {
        if self.0.is_zero() {
            Err(PriceError::NotPositive)
        } else {
            Ok(self)
        }
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let amount = Decimal::from_str_exact(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_accepts_numbers_and_numeric_strings() {
        assert_eq!(Price::from_json(&json!(12.5)).unwrap().to_cents(), 1250);
        assert_eq!(Price::from_json(&json!(3)).unwrap().to_cents(), 300);
        assert_eq!(Price::from_json(&json!(" 7.25 ")).unwrap().to_cents(), 725);
        assert_eq!(Price::from_json(&json!("1e2")).unwrap().to_cents(), 10_000);
        assert_eq!(Price::from_json(&json!(0)).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_from_json_rejects_non_numbers() {
        for value in [
            json!(null),
            json!(true),
            json!("doce"),
            json!(""),
            json!("NaN"),
            json!([1]),
            json!({"monto": 1}),
        ] {
            assert_eq!(
                Price::from_json(&value),
                Err(PriceError::NotANumber),
                "{value}"
            );
        }
    }

    #[test]
    fn test_range_checks() {
        assert_eq!(Price::from_json(&json!(-0.5)), Err(PriceError::Negative));
        assert!(Price::from_json(&json!("99999999.99")).is_ok());
        assert!(matches!(
            Price::from_json(&json!("100000000")),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_max_is_ten_digits_two_places() {
        assert_eq!(Price::MAX, Decimal::new(9_999_999_999, 2));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(Price::from_str("0.005").unwrap().to_cents(), 1);
        assert_eq!(Price::from_str("2.344").unwrap().to_cents(), 234);
        assert_eq!(Price::from_str("-0.001").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_cents_roundtrip() {
        let price = Price::from_cents(123_456).unwrap();
        assert_eq!(price.to_string(), "1234.56");
        assert_eq!(price.to_cents(), 123_456);
        assert!(Price::from_cents(-1).is_err());
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(
            Price::ZERO.require_positive(),
            Err(PriceError::NotPositive)
        );
        assert!(Price::from_cents(1).unwrap().require_positive().is_ok());
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::from_str("19.90").unwrap();
        assert_eq!(serde_json::to_value(price).unwrap(), json!(19.9));
    }

    #[test]
    fn test_deserialize_validates() {
        let price: Price = serde_json::from_value(json!("4.50")).unwrap();
        assert_eq!(price.to_cents(), 450);
        assert!(serde_json::from_value::<Price>(json!("gratis")).is_err());
    }
}
