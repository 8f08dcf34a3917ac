//! # Money Module
//!
//! Exact decimal money for the ledger. `Amount` wraps `rust_decimal::Decimal`
//! and is non-negative by construction: direction is carried by the
//! transaction kind, never by the sign of the amount.

use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A non-negative decimal amount.
///
/// # Invariant
/// The inner value is always `>= 0`. Enforced by the constructor.
///
/// # Examples
/// ```
/// use susu_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::new(Decimal::new(5000, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(5000, 2));
///
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create a new Amount. Fails on negative values.
    pub fn new(value: Decimal) -> Result<Self, CoreError> {
        if value < Decimal::ZERO {
            Err(CoreError::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create an Amount that must additionally be strictly positive.
    ///
    /// Ledger entries and transfer requests use this: a zero-value
    /// transaction is meaningless.
    pub fn positive(value: Decimal) -> Result<Self, CoreError> {
        if value <= Decimal::ZERO {
            Err(CoreError::NonPositiveAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Checked addition
    pub fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction. `None` if the result would go negative.
    pub fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.0
            .checked_sub(other.0)
            .filter(|v| *v >= Decimal::ZERO)
            .map(Amount)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-4217-like 3-letter currency code.
///
/// The platform's default currency is GHS (Ghanaian cedi).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Platform default: Ghanaian cedi
    pub fn ghs() -> Self {
        Self("GHS".to_string())
    }

    /// Parse a currency code: exactly 3 ASCII letters, normalized uppercase.
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(CoreError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::ghs()
    }
}

impl FromStr for CurrencyCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_rejects_negative() {
        assert!(Amount::new(dec!(-0.01)).is_err());
        assert!(Amount::new(dec!(0)).is_ok());
        assert!(Amount::new(dec!(1150.00)).is_ok());
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(Amount::positive(dec!(0)).is_err());
        assert!(Amount::positive(dec!(-5)).is_err());
        assert!(Amount::positive(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_checked_sub_never_goes_negative() {
        let a = Amount::new(dec!(100)).unwrap();
        let b = Amount::new(dec!(150)).unwrap();
        assert_eq!(a.checked_sub(b), None);
        assert_eq!(
            b.checked_sub(a),
            Some(Amount::new(dec!(50)).unwrap())
        );
    }

    #[test]
    fn test_exact_decimal_arithmetic() {
        // 0.1 + 0.2 is exactly 0.3 with Decimal; the whole point of not
        // using binary floats for balances.
        let a = Amount::new(dec!(0.1)).unwrap();
        let b = Amount::new(dec!(0.2)).unwrap();
        assert_eq!(a.checked_add(b).unwrap().value(), dec!(0.3));
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(CurrencyCode::parse("ghs").unwrap().as_str(), "GHS");
        assert_eq!(CurrencyCode::parse("USD").unwrap().as_str(), "USD");
        assert!(CurrencyCode::parse("CEDI").is_err());
        assert!(CurrencyCode::parse("G1S").is_err());
        assert!(CurrencyCode::parse("").is_err());
    }

    #[test]
    fn test_default_currency_is_ghs() {
        assert_eq!(CurrencyCode::default().as_str(), "GHS");
    }
}
