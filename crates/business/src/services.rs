//! Service context shared by the business services.

use sqlx::SqlitePool;
use std::sync::Arc;
use susu_persistence::Database;
use tokio::sync::{Mutex, MutexGuard};

/// Context for business operations - carries database access and the
/// in-process writer lock.
///
/// Cheap to clone; all services share the same pool and lock.
#[derive(Clone)]
pub struct ServiceContext {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl ServiceContext {
    /// Create a service context from the database facade
    pub fn new(db: &Database) -> Self {
        Self::from_pool(db.pool().clone())
    }

    /// Create from a pool directly
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Serialize write transactions within this process.
    ///
    /// Two concurrent deferred SQLite transactions that both try to
    /// upgrade to a write abort immediately instead of waiting on the busy
    /// timeout; holding this guard across the whole check-and-mutate
    /// transaction avoids that, and is the exclusive lock the balance
    /// invariant requires. Reads never take it. Cross-process writers are
    /// still covered by the busy timeout plus the bounded
    /// write-conflict retry.
    pub async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}
