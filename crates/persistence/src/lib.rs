//! # Susu Persistence
//!
//! SQLite persistence for the Susu ledger.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Database                           │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │   SQLite    │   │  migrations  │   │    Repos     │  │
//! │  │ (WAL, pool) │   │  (sqlx)      │   │  (queries)   │  │
//! │  └─────────────┘   └──────────────┘   └──────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository function takes `&mut SqliteConnection`, so callers
//! decide the transaction boundary. The transfer path relies on this:
//! all four of its writes go through one transaction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use susu_persistence::{AccountRepo, Database};
//!
//! let db = Database::open("susu.db").await?;
//! let mut conn = db.pool().acquire().await?;
//! let account = AccountRepo::get_by_owner(&mut conn, "OWN_001").await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::{
    AccountRepo, AccountRow, IdempotencyRepo, KindTotal, Page, TransactionFilter, TransactionRepo,
    TransactionRow, TransferKeyRow,
};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Bounded timeouts for every persistence call
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Database facade over the SQLite pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) a database file and run migrations.
    pub async fn open<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect(&url).await
    }

    /// Connect to a database URL and run migrations.
    ///
    /// WAL journal mode keeps stats/history reads concurrent with transfer
    /// writes; the busy timeout bounds how long a writer waits before the
    /// call fails as a write conflict.
    pub async fn connect(db_url: &str) -> PersistenceResult<Self> {
        let options = SqliteConnectOptions::from_str(db_url)
            .map_err(PersistenceError::Database)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Get the SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
