//! SQLite persistence module
//!
//! Repository pattern for SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{
    AccountRepo, IdempotencyRepo, KindTotal, Page, TransactionFilter, TransactionRepo,
};
pub use schema::{AccountRow, TransactionRow, TransferKeyRow};
