//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables, plus conversions to and
//! from the domain types. The schema itself lives in
//! `migrations/20260830000000_init.sql`.

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use susu_core::{
    Account, AccountNumber, AccountStatus, Amount, CounterpartySnapshot, CurrencyCode, Reference,
    Transaction, TxCategory, TxKind, TxStatus,
};

/// Parse a TEXT decimal column
pub(crate) fn parse_decimal(column: &str, value: &str) -> PersistenceResult<Decimal> {
    Decimal::from_str(value).map_err(|_| PersistenceError::invalid_decimal(column, value))
}

fn parse_enum<T>(field: &str, value: &str, parse: impl FnOnce(&str) -> Option<T>) -> PersistenceResult<T> {
    parse(value).ok_or_else(|| PersistenceError::InvalidEnumValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Row type for the `accounts` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AccountRow {
    pub id: String,
    pub owner_id: String,
    pub owner_name: String,
    pub balance: String, // Decimal stored as TEXT
    pub account_number: String,
    pub currency: String,
    pub status: String,
    pub last_transaction_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = PersistenceError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            balance: parse_decimal("accounts.balance", &row.balance)?,
            account_number: AccountNumber::parse(&row.account_number)?,
            currency: CurrencyCode::parse(&row.currency)?,
            status: parse_enum("accounts.status", &row.status, AccountStatus::parse)?,
            id: row.id,
            owner_id: row.owner_id,
            owner_name: row.owner_name,
            last_transaction_date: row.last_transaction_date,
            created_at: row.created_at,
        })
    }
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            owner_id: account.owner_id.clone(),
            owner_name: account.owner_name.clone(),
            balance: account.balance.to_string(),
            account_number: account.account_number.as_str().to_string(),
            currency: account.currency.as_str().to_string(),
            status: account.status.as_str().to_string(),
            last_transaction_date: account.last_transaction_date,
            created_at: account.created_at,
        }
    }
}

/// Row type for the `transactions` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    pub owner_id: String,
    pub account_id: String,
    pub kind: String,
    pub amount: String, // Decimal stored as TEXT
    pub currency: String,
    pub description: String,
    pub reference: String,
    pub status: String,
    pub category: String,
    pub counterparty_name: Option<String>,
    pub counterparty_account_number: Option<String>,
    pub transfer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = PersistenceError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let counterparty = match (row.counterparty_name, row.counterparty_account_number) {
            (Some(name), Some(number)) => Some(CounterpartySnapshot {
                name,
                account_number: AccountNumber::parse(&number)?,
            }),
            _ => None,
        };
        Ok(Transaction {
            kind: parse_enum("transactions.kind", &row.kind, TxKind::parse)?,
            amount: Amount::new(parse_decimal("transactions.amount", &row.amount)?)?,
            currency: CurrencyCode::parse(&row.currency)?,
            reference: Reference::parse(&row.reference)?,
            status: parse_enum("transactions.status", &row.status, TxStatus::parse)?,
            category: parse_enum("transactions.category", &row.category, TxCategory::parse)?,
            counterparty,
            id: row.id,
            owner_id: row.owner_id,
            account_id: row.account_id,
            description: row.description,
            transfer_id: row.transfer_id,
            created_at: row.created_at,
        })
    }
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            owner_id: tx.owner_id.clone(),
            account_id: tx.account_id.clone(),
            kind: tx.kind.as_str().to_string(),
            amount: tx.amount.value().to_string(),
            currency: tx.currency.as_str().to_string(),
            description: tx.description.clone(),
            reference: tx.reference.as_str().to_string(),
            status: tx.status.as_str().to_string(),
            category: tx.category.as_str().to_string(),
            counterparty_name: tx.counterparty.as_ref().map(|c| c.name.clone()),
            counterparty_account_number: tx
                .counterparty
                .as_ref()
                .map(|c| c.account_number.as_str().to_string()),
            transfer_id: tx.transfer_id.clone(),
            created_at: tx.created_at,
        }
    }
}

/// Row type for the `transfer_keys` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransferKeyRow {
    pub key: String,
    pub receipt: String, // JSON-encoded receipt
    pub created_at: DateTime<Utc>,
}
