//! # Error Module
//!
//! Domain errors for the Susu core types. Infrastructure errors
//! (database, I/O) live in the persistence and business layers.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Money errors ===
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Amount must be positive: {0}")]
    NonPositiveAmount(Decimal),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    // === Account errors ===
    #[error("Invalid account number: {0}")]
    InvalidAccountNumber(String),

    #[error("Account number space exhausted")]
    AccountNumberExhausted,

    #[error("Illegal account status transition: {from} -> {to}")]
    IllegalStatusTransition { from: String, to: String },

    // === Ledger errors ===
    #[error("Invalid transaction reference: {0}")]
    InvalidReference(String),

    // === Validation errors ===
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NegativeAmount(_)
                | Self::NonPositiveAmount(_)
                | Self::InvalidCurrency(_)
                | Self::InvalidAccountNumber(_)
                | Self::InvalidReference(_)
                | Self::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = CoreError::NegativeAmount(dec!(-5));
        assert_eq!(err.to_string(), "Amount cannot be negative: -5");

        let err = CoreError::IllegalStatusTransition {
            from: "closed".to_string(),
            to: "active".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Illegal account status transition: closed -> active"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(CoreError::NonPositiveAmount(dec!(0)).is_validation());
        assert!(!CoreError::AccountNumberExhausted.is_validation());
    }
}
