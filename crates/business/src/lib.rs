//! # Susu Business
//!
//! Business logic for the Susu ledger.
//!
//! ## Services
//!
//! - [`AccountService`] - onboarding, lookups, status transitions
//! - [`LedgerService`] - recording entries, filtered history
//! - [`TransferService`] - atomic transfers, deposits, withdrawals
//!
//! All services share a [`ServiceContext`] around one SQLite pool. The
//! failure taxonomy is [`LedgerError`]; deterministic client failures are
//! returned as-is, transient write conflicts are retried internally.

pub mod accounts;
pub mod error;
pub mod ledger;
pub mod services;
pub mod transfer;

pub use accounts::AccountService;
pub use error::{LedgerError, LedgerResult};
pub use ledger::LedgerService;
pub use services::ServiceContext;
pub use transfer::{BalanceReceipt, TransferReceipt, TransferRequest, TransferService};
