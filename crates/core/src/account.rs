//! # Account Module
//!
//! The balance-holding entity. Each owner has exactly one Account; the
//! account number is allocated once and never reused or changed.

use crate::error::CoreError;
use crate::money::CurrencyCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account status with an explicit state machine.
///
/// Legal transitions: Active <-> Suspended, Active -> Closed,
/// Suspended -> Closed. Closed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account operates normally
    Active,
    /// Temporarily blocked from value-moving operations
    Suspended,
    /// Permanently closed; terminal state
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(AccountStatus::Active),
            "suspended" => Some(AccountStatus::Suspended),
            "closed" => Some(AccountStatus::Closed),
            _ => None,
        }
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(&self, to: AccountStatus) -> bool {
        use AccountStatus::*;
        matches!(
            (self, to),
            (Active, Suspended) | (Suspended, Active) | (Active, Closed) | (Suspended, Closed)
        )
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account number: `GH` followed by exactly 10 decimal digits.
///
/// Immutable once assigned; allocated from a monotonic sequence so two
/// accounts can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Number of decimal digits after the `GH` prefix
    pub const DIGITS: usize = 10;

    /// Parse and validate an account number string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let digits = s
            .strip_prefix("GH")
            .ok_or_else(|| CoreError::InvalidAccountNumber(s.to_string()))?;
        if digits.len() == Self::DIGITS && digits.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::InvalidAccountNumber(s.to_string()))
        }
    }

    /// Derive the account number for a sequence value.
    ///
    /// Fails with `AccountNumberExhausted` once the 10-digit space is used
    /// up (sequence values beyond 9_999_999_999).
    pub fn from_sequence(seq: u64) -> Result<Self, CoreError> {
        if seq >= 10u64.pow(Self::DIGITS as u32) {
            return Err(CoreError::AccountNumberExhausted);
        }
        Ok(Self(format!("GH{:010}", seq)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountNumber> for String {
    fn from(n: AccountNumber) -> Self {
        n.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The balance-holding entity, 1:1 with an owner.
///
/// # Invariants
/// - `balance >= 0` at all times
/// - exactly one Account per owner
/// - `account_number` never reused or mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Opaque system-assigned id (ACC_ + uuid)
    pub id: String,
    /// Owner this account belongs to (unique across accounts)
    pub owner_id: String,
    /// Display name captured for counterparty snapshots
    pub owner_name: String,
    /// Current balance; exact decimal, never negative
    pub balance: Decimal,
    /// Globally unique, immutable account number
    pub account_number: AccountNumber,
    /// 3-letter currency code, defaults to GHS
    pub currency: CurrencyCode,
    pub status: AccountStatus,
    /// When the balance last changed
    pub last_transaction_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a fresh account with a zero balance.
    pub fn new(
        owner_id: &str,
        owner_name: &str,
        account_number: AccountNumber,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            owner_id: owner_id.to_string(),
            owner_name: owner_name.to_string(),
            balance: Decimal::ZERO,
            account_number,
            currency,
            status: AccountStatus::Active,
            last_transaction_date: None,
            created_at: Utc::now(),
        }
    }

    /// Generate an opaque account id
    pub fn generate_id() -> String {
        format!("ACC_{}", uuid::Uuid::new_v4().simple())
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Apply a status change, enforcing the state machine.
    pub fn transition_status(&mut self, to: AccountStatus) -> Result<(), CoreError> {
        if self.status == to {
            return Ok(());
        }
        if !self.status.can_transition_to(to) {
            return Err(CoreError::IllegalStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} (owner: {}, balance: {} {}, status: {})",
            self.account_number, self.owner_id, self.balance, self.currency, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account() -> Account {
        Account::new(
            "OWN_001",
            "Ama Mensah",
            AccountNumber::from_sequence(1).unwrap(),
            CurrencyCode::ghs(),
        )
    }

    #[test]
    fn test_account_number_format() {
        let n = AccountNumber::from_sequence(42).unwrap();
        assert_eq!(n.as_str(), "GH0000000042");

        assert!(AccountNumber::parse("GH0000000042").is_ok());
        assert!(AccountNumber::parse("GH000000042").is_err()); // 9 digits
        assert!(AccountNumber::parse("GB0000000042").is_err()); // wrong prefix
        assert!(AccountNumber::parse("GH00000000AB").is_err()); // non-digit
    }

    #[test]
    fn test_account_number_exhaustion() {
        assert!(AccountNumber::from_sequence(9_999_999_999).is_ok());
        assert!(matches!(
            AccountNumber::from_sequence(10_000_000_000),
            Err(CoreError::AccountNumberExhausted)
        ));
    }

    #[test]
    fn test_new_account_defaults() {
        let account = test_account();
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.currency.as_str(), "GHS");
        assert!(account.last_transaction_date.is_none());
        assert!(account.id.starts_with("ACC_"));
    }

    #[test]
    fn test_status_state_machine() {
        let mut account = test_account();

        account.transition_status(AccountStatus::Suspended).unwrap();
        assert_eq!(account.status, AccountStatus::Suspended);

        account.transition_status(AccountStatus::Active).unwrap();
        account.transition_status(AccountStatus::Closed).unwrap();

        // Closed is terminal
        let err = account
            .transition_status(AccountStatus::Active)
            .unwrap_err();
        assert!(matches!(err, CoreError::IllegalStatusTransition { .. }));
        assert_eq!(account.status, AccountStatus::Closed);
    }

    #[test]
    fn test_same_status_transition_is_noop() {
        let mut account = test_account();
        account.transition_status(AccountStatus::Active).unwrap();
        assert!(account.is_active());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            AccountStatus::Active,
            AccountStatus::Suspended,
            AccountStatus::Closed,
        ] {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::parse("frozen"), None);
    }
}
