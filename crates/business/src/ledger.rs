//! Ledger operations - recording entries, filtered history.
//!
//! The transactions table is append-only; nothing in this module (or
//! anywhere else) updates or deletes a persisted row.

use crate::error::{LedgerError, LedgerResult};
use crate::services::ServiceContext;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use susu_core::{NewTransaction, Reference, StatsPeriod, Transaction, TxStatus};
use susu_persistence::{KindTotal, Page, PersistenceError, TransactionFilter, TransactionRepo};

/// Attempts before giving up on reference generation. A collision requires
/// two entries in the same millisecond drawing the same 9 random base-36
/// characters, so more than one retry is already unexpected.
const MAX_REFERENCE_ATTEMPTS: u32 = 5;

/// Upper bound a caller may request per history page
const MAX_PAGE_LIMIT: u32 = 100;

/// Build a completed ledger entry and insert it, regenerating the
/// reference on the (rare) UNIQUE collision.
///
/// Shared by `LedgerService::record` and the transfer path, which calls it
/// inside its own transaction.
pub(crate) async fn append_entry(
    conn: &mut SqliteConnection,
    new: NewTransaction,
) -> LedgerResult<Transaction> {
    for _ in 0..MAX_REFERENCE_ATTEMPTS {
        let now = Utc::now();
        let entry = Transaction {
            id: Transaction::generate_id(),
            owner_id: new.owner_id.clone(),
            account_id: new.account_id.clone(),
            kind: new.kind,
            amount: new.amount,
            currency: new.currency.clone(),
            description: new.description.clone(),
            reference: Reference::generate(now),
            status: TxStatus::Completed,
            category: new.category,
            counterparty: new.counterparty.clone(),
            transfer_id: new.transfer_id.clone(),
            created_at: now,
        };
        match TransactionRepo::insert(conn, &entry).await {
            Ok(()) => return Ok(entry),
            Err(err) if err.violates("transactions.reference") => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(LedgerError::GenerationExhausted)
}

/// Ledger Service - append and query the transaction log
pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a single ledger entry (status defaults to Completed).
    pub async fn record(&self, new: NewTransaction) -> LedgerResult<Transaction> {
        let _guard = self.ctx.write_guard().await;
        let mut tx = self
            .ctx
            .pool()
            .begin()
            .await
            .map_err(PersistenceError::from)?;
        let entry = append_entry(&mut tx, new).await?;
        tx.commit().await.map_err(PersistenceError::from)?;
        Ok(entry)
    }

    /// Paged history for an owner, newest first.
    pub async fn history(
        &self,
        owner_id: &str,
        filter: &TransactionFilter,
        page: Page,
    ) -> LedgerResult<Vec<Transaction>> {
        if page.page == 0 || page.limit == 0 {
            return Err(LedgerError::validation(
                "page and limit must be positive",
            ));
        }
        if page.limit > MAX_PAGE_LIMIT {
            return Err(LedgerError::validation(format!(
                "limit must not exceed {MAX_PAGE_LIMIT}"
            )));
        }

        let mut conn = self
            .ctx
            .pool()
            .acquire()
            .await
            .map_err(PersistenceError::from)?;
        Ok(TransactionRepo::query(&mut conn, owner_id, filter, page).await?)
    }

    /// Look up one entry by its public reference.
    pub async fn by_reference(&self, reference: &str) -> LedgerResult<Transaction> {
        let mut conn = self
            .ctx
            .pool()
            .acquire()
            .await
            .map_err(PersistenceError::from)?;
        Ok(TransactionRepo::get_by_reference(&mut conn, reference).await?)
    }

    /// Both legs of a transfer, for reconciliation.
    pub async fn transfer_legs(&self, transfer_id: &str) -> LedgerResult<Vec<Transaction>> {
        let mut conn = self
            .ctx
            .pool()
            .acquire()
            .await
            .map_err(PersistenceError::from)?;
        Ok(TransactionRepo::get_by_transfer_id(&mut conn, transfer_id).await?)
    }

    /// Per-kind totals of an owner's completed entries in a period window.
    /// The stats read side wraps this into a dashboard summary.
    pub async fn aggregate(
        &self,
        owner_id: &str,
        period: StatsPeriod,
        now: DateTime<Utc>,
    ) -> LedgerResult<Vec<KindTotal>> {
        let since = period.start_from(now);
        let mut conn = self
            .ctx
            .pool()
            .acquire()
            .await
            .map_err(PersistenceError::from)?;
        Ok(TransactionRepo::aggregate(&mut conn, owner_id, since).await?)
    }
}
