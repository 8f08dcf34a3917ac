//! # Susu Core
//!
//! Core domain types for the Susu microfinance ledger.
//!
//! This crate is pure domain logic - no I/O, no database. It defines:
//!
//! - [`Amount`] / [`CurrencyCode`] - exact decimal money (never a float)
//! - [`Account`] / [`AccountNumber`] / [`AccountStatus`] - the balance store
//! - [`Transaction`] / [`Reference`] - append-only ledger entries
//! - [`StatsPeriod`] - reporting windows for aggregation
//! - [`CoreError`] - domain errors, independent of infrastructure

pub mod account;
pub mod error;
pub mod money;
pub mod period;
pub mod transaction;

pub use account::{Account, AccountNumber, AccountStatus};
pub use error::{CoreError, CoreResult};
pub use money::{Amount, CurrencyCode};
pub use period::StatsPeriod;
pub use transaction::{
    CounterpartySnapshot, NewTransaction, Reference, Transaction, TxCategory, TxKind, TxStatus,
};
