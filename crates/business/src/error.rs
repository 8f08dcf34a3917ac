//! Business layer errors
//!
//! The client-facing failure taxonomy. Validation, not-found,
//! insufficient-funds, and self-transfer are deterministic and returned
//! synchronously; `WriteConflict` is retried internally a bounded number of
//! times before it ever reaches a caller.

use rust_decimal::Decimal;
use susu_core::CoreError;
use susu_persistence::PersistenceError;
use thiserror::Error;

/// Ledger operation errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Transfer to own account rejected")]
    SelfTransfer,

    #[error("Account already exists for owner {0}")]
    AlreadyExists(String),

    #[error("Identifier allocation exhausted")]
    GenerationExhausted,

    /// Transient; surfaced only after internal retries are exhausted
    #[error("Write conflict: concurrent update, retry later")]
    WriteConflict,

    #[error("Internal error: {0}")]
    Internal(#[source] Box<PersistenceError>),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn not_found(what: &'static str, id: &str) -> Self {
        Self::NotFound {
            what,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Whether the operation may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WriteConflict)
    }
}

impl From<PersistenceError> for LedgerError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::WriteConflict => Self::WriteConflict,
            PersistenceError::NotFound { entity, id } => Self::NotFound {
                what: match entity.as_str() {
                    "Account" => "account",
                    "Transaction" => "transaction",
                    _ => "record",
                },
                id,
            },
            other => Self::Internal(Box::new(other)),
        }
    }
}

impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AccountNumberExhausted => Self::GenerationExhausted,
            other => Self::Validation(other.to_string()),
        }
    }
}
