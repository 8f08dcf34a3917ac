//! # Transaction Module
//!
//! Append-only ledger entries. Once a transaction is recorded as completed
//! it is never mutated - the ledger is the audit trail.

use crate::account::AccountNumber;
use crate::error::CoreError;
use crate::money::{Amount, CurrencyCode};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction/kind of a ledger entry. The amount is always positive;
/// the kind carries the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Money in (deposit, incoming transfer leg)
    Credit,
    /// Money out (withdrawal, payment)
    Debit,
    /// Outgoing transfer leg; balance-decreasing, bucketed separately
    /// from plain debits in statistics
    Transfer,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Credit => "credit",
            TxKind::Debit => "debit",
            TxKind::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credit" => Some(TxKind::Credit),
            "debit" => Some(TxKind::Debit),
            "transfer" => Some(TxKind::Transfer),
            _ => None,
        }
    }

    /// Whether entries of this kind decrease the account balance.
    pub fn decreases_balance(&self) -> bool {
        matches!(self, TxKind::Debit | TxKind::Transfer)
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a ledger entry. `Completed` rows are frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Completed => "completed",
            TxStatus::Failed => "failed",
            TxStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(TxStatus::Pending),
            "completed" => Some(TxStatus::Completed),
            "failed" => Some(TxStatus::Failed),
            "cancelled" => Some(TxStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending category attached to a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxCategory {
    Transfer,
    Payment,
    Deposit,
    Withdrawal,
    Bill,
    Airtime,
    Data,
    Other,
}

impl TxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxCategory::Transfer => "transfer",
            TxCategory::Payment => "payment",
            TxCategory::Deposit => "deposit",
            TxCategory::Withdrawal => "withdrawal",
            TxCategory::Bill => "bill",
            TxCategory::Airtime => "airtime",
            TxCategory::Data => "data",
            TxCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "transfer" => Some(TxCategory::Transfer),
            "payment" => Some(TxCategory::Payment),
            "deposit" => Some(TxCategory::Deposit),
            "withdrawal" => Some(TxCategory::Withdrawal),
            "bill" => Some(TxCategory::Bill),
            "airtime" => Some(TxCategory::Airtime),
            "data" => Some(TxCategory::Data),
            "other" => Some(TxCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for TxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Externally visible unique identifier for a ledger entry.
///
/// Wire format: `TXN` + base-36 millisecond timestamp (lowercase) +
/// 9 uppercase base-36 random characters. The persistence layer backs this
/// with a UNIQUE constraint; on the rare collision a fresh reference is
/// generated and the insert retried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference(String);

impl Reference {
    const SUFFIX_LEN: usize = 9;
    const BASE36: &'static [u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Generate a fresh reference for `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..Self::SUFFIX_LEN)
            .map(|_| Self::BASE36[rng.gen_range(0..Self::BASE36.len())] as char)
            .collect();
        Self(format!(
            "TXN{}{}",
            base36_lower(now.timestamp_millis().max(0) as u64),
            suffix
        ))
    }

    /// Validate a reference string coming from outside.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let body = s
            .strip_prefix("TXN")
            .ok_or_else(|| CoreError::InvalidReference(s.to_string()))?;
        if body.len() > Self::SUFFIX_LEN && body.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::InvalidReference(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn base36_lower(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let digits = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    while n > 0 {
        out.push(digits[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}

impl TryFrom<String> for Reference {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Reference> for String {
    fn from(r: Reference) -> Self {
        r.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time snapshot of the other party of a transfer, captured at
/// recording time. Never re-resolved: renaming an owner later does not
/// rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartySnapshot {
    pub name: String,
    pub account_number: AccountNumber,
}

/// A single ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque system-assigned id (TXR_ + uuid)
    pub id: String,
    pub owner_id: String,
    pub account_id: String,
    pub kind: TxKind,
    /// Always positive; direction is carried by `kind`
    pub amount: Amount,
    pub currency: CurrencyCode,
    pub description: String,
    /// Globally unique, immutable
    pub reference: Reference,
    pub status: TxStatus,
    pub category: TxCategory,
    /// The recipient (on an outgoing leg) or sender (on an incoming leg)
    pub counterparty: Option<CounterpartySnapshot>,
    /// Shared by both legs of one transfer; None for single-leg entries
    pub transfer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn generate_id() -> String {
        format!("TXR_{}", uuid::Uuid::new_v4().simple())
    }

    /// Generate the shared id linking the two legs of one transfer.
    pub fn generate_transfer_id() -> String {
        format!("TRF_{}", uuid::Uuid::new_v4().simple())
    }
}

/// Input for recording a new ledger entry. The ledger assigns the id,
/// reference, and timestamp; status defaults to `Completed`.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub owner_id: String,
    pub account_id: String,
    pub kind: TxKind,
    pub amount: Amount,
    pub currency: CurrencyCode,
    pub description: String,
    pub category: TxCategory,
    pub counterparty: Option<CounterpartySnapshot>,
    pub transfer_id: Option<String>,
}
