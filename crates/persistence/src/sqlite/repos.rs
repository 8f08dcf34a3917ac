//! Repository implementations for SQLite
//!
//! All functions take `&mut SqliteConnection` so they compose into a single
//! sqlx transaction: the transfer path runs its debit, credit, both ledger
//! inserts, and the idempotency record on one connection and commits them
//! as one unit.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::{parse_decimal, AccountRow, TransactionRow, TransferKeyRow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use susu_core::{Account, AccountStatus, Transaction, TxCategory, TxKind, TxStatus};

/// Filter for ledger history queries
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TxKind>,
    pub category: Option<TxCategory>,
}

/// 1-based pagination
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// Per-kind rollup of completed transactions in a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindTotal {
    pub kind: TxKind,
    pub total: Decimal,
    pub count: u64,
}

// ============================================================================
// Account Repository
// ============================================================================

/// Repository for the accounts table
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account. Maps a duplicate owner to `UniqueViolation`.
    pub async fn insert(conn: &mut SqliteConnection, account: &Account) -> PersistenceResult<()> {
        let row = AccountRow::from(account);
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, owner_id, owner_name, balance, account_number, currency,
                 status, last_transaction_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.owner_id)
        .bind(&row.owner_name)
        .bind(&row.balance)
        .bind(&row.account_number)
        .bind(&row.currency)
        .bind(&row.status)
        .bind(row.last_transaction_date)
        .bind(row.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn get_by_owner(
        conn: &mut SqliteConnection,
        owner_id: &str,
    ) -> PersistenceResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_optional(conn)
            .await?;
        row.map(Account::try_from).transpose()
    }

    pub async fn get_by_number(
        conn: &mut SqliteConnection,
        account_number: &str,
    ) -> PersistenceResult<Option<Account>> {
        let row =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE account_number = ?")
                .bind(account_number)
                .fetch_optional(conn)
                .await?;
        row.map(Account::try_from).transpose()
    }

    pub async fn get_by_id(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> PersistenceResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Account", id))?;
        Account::try_from(row)
    }

    /// Bump and return the account-number sequence.
    ///
    /// Caller must hold a write transaction so the bump and the account
    /// insert that consumes it commit together.
    pub async fn next_account_sequence(conn: &mut SqliteConnection) -> PersistenceResult<u64> {
        sqlx::query("UPDATE account_sequence SET value = value + 1 WHERE id = 1")
            .execute(&mut *conn)
            .await?;
        let (value,): (i64,) = sqlx::query_as("SELECT value FROM account_sequence WHERE id = 1")
            .fetch_one(conn)
            .await?;
        Ok(value as u64)
    }

    /// Overwrite the stored balance and bump `last_transaction_date`.
    ///
    /// Only called from inside the same transaction that read and checked
    /// the balance; the write lock held by that transaction is what makes
    /// the check-and-mutate step safe.
    pub async fn update_balance(
        conn: &mut SqliteConnection,
        account_id: &str,
        new_balance: Decimal,
        at: DateTime<Utc>,
    ) -> PersistenceResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET balance = ?, last_transaction_date = ? WHERE id = ?",
        )
        .bind(new_balance.to_string())
        .bind(at)
        .bind(account_id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", account_id));
        }
        Ok(())
    }

    pub async fn update_status(
        conn: &mut SqliteConnection,
        account_id: &str,
        status: AccountStatus,
    ) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE accounts SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(account_id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Account", account_id));
        }
        Ok(())
    }

    /// Exact sum of all balances. Conservation check: internal transfers
    /// must never change this value.
    pub async fn sum_balances(conn: &mut SqliteConnection) -> PersistenceResult<Decimal> {
        let balances: Vec<(String,)> = sqlx::query_as("SELECT balance FROM accounts")
            .fetch_all(conn)
            .await?;
        let mut total = Decimal::ZERO;
        for (balance,) in &balances {
            total += parse_decimal("accounts.balance", balance)?;
        }
        Ok(total)
    }
}

// ============================================================================
// Transaction Repository
// ============================================================================

/// Repository for the transactions table. Append-only: there is no update
/// and no delete here, on purpose.
pub struct TransactionRepo;

impl TransactionRepo {
    pub async fn insert(
        conn: &mut SqliteConnection,
        tx: &Transaction,
    ) -> PersistenceResult<()> {
        let row = TransactionRow::from(tx);
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, owner_id, account_id, kind, amount, currency, description,
                 reference, status, category, counterparty_name,
                 counterparty_account_number, transfer_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.owner_id)
        .bind(&row.account_id)
        .bind(&row.kind)
        .bind(&row.amount)
        .bind(&row.currency)
        .bind(&row.description)
        .bind(&row.reference)
        .bind(&row.status)
        .bind(&row.category)
        .bind(&row.counterparty_name)
        .bind(&row.counterparty_account_number)
        .bind(&row.transfer_id)
        .bind(row.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Paged history for one owner, newest first.
    pub async fn query(
        conn: &mut SqliteConnection,
        owner_id: &str,
        filter: &TransactionFilter,
        page: Page,
    ) -> PersistenceResult<Vec<Transaction>> {
        let mut sql = String::from("SELECT * FROM transactions WHERE owner_id = ?");
        if filter.kind.is_some() {
            sql.push_str(" AND kind = ?");
        }
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, TransactionRow>(&sql).bind(owner_id);
        if let Some(kind) = filter.kind {
            query = query.bind(kind.as_str());
        }
        if let Some(category) = filter.category {
            query = query.bind(category.as_str());
        }
        let rows = query
            .bind(page.limit as i64)
            .bind(page.offset())
            .fetch_all(conn)
            .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    pub async fn get_by_reference(
        conn: &mut SqliteConnection,
        reference: &str,
    ) -> PersistenceResult<Transaction> {
        let row =
            sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE reference = ?")
                .bind(reference)
                .fetch_optional(conn)
                .await?
                .ok_or_else(|| PersistenceError::not_found("Transaction", reference))?;
        Transaction::try_from(row)
    }

    /// Both legs of one transfer, for reconciliation.
    pub async fn get_by_transfer_id(
        conn: &mut SqliteConnection,
        transfer_id: &str,
    ) -> PersistenceResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE transfer_id = ? ORDER BY kind",
        )
        .bind(transfer_id)
        .fetch_all(conn)
        .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Per-kind totals of completed transactions in `[since, now]`.
    ///
    /// Amounts are TEXT decimals, so summation happens here in exact
    /// decimal arithmetic rather than in SQL.
    pub async fn aggregate(
        conn: &mut SqliteConnection,
        owner_id: &str,
        since: DateTime<Utc>,
    ) -> PersistenceResult<Vec<KindTotal>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT kind, amount FROM transactions
            WHERE owner_id = ? AND status = ? AND created_at >= ?
            "#,
        )
        .bind(owner_id)
        .bind(TxStatus::Completed.as_str())
        .bind(since)
        .fetch_all(conn)
        .await?;

        let mut totals: Vec<KindTotal> = Vec::new();
        for (kind_str, amount_str) in &rows {
            let kind = TxKind::parse(kind_str).ok_or_else(|| {
                PersistenceError::InvalidEnumValue {
                    field: "transactions.kind".to_string(),
                    value: kind_str.clone(),
                }
            })?;
            let amount = parse_decimal("transactions.amount", amount_str)?;
            match totals.iter_mut().find(|t| t.kind == kind) {
                Some(t) => {
                    t.total += amount;
                    t.count += 1;
                }
                None => totals.push(KindTotal {
                    kind,
                    total: amount,
                    count: 1,
                }),
            }
        }
        Ok(totals)
    }

}

// ============================================================================
// Idempotency Repository
// ============================================================================

/// Repository for the transfer_keys table
pub struct IdempotencyRepo;

impl IdempotencyRepo {
    pub async fn get(
        conn: &mut SqliteConnection,
        key: &str,
    ) -> PersistenceResult<Option<TransferKeyRow>> {
        let row =
            sqlx::query_as::<_, TransferKeyRow>("SELECT * FROM transfer_keys WHERE key = ?")
                .bind(key)
                .fetch_optional(conn)
                .await?;
        Ok(row)
    }

    /// Store a key with its receipt. A duplicate key surfaces as
    /// `UniqueViolation`, which the transfer path treats as "already
    /// applied".
    pub async fn insert(
        conn: &mut SqliteConnection,
        key: &str,
        receipt_json: &str,
        at: DateTime<Utc>,
    ) -> PersistenceResult<()> {
        sqlx::query("INSERT INTO transfer_keys (key, receipt, created_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(receipt_json)
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Trim the retention window. Returns the number of keys removed.
    pub async fn purge_before(
        conn: &mut SqliteConnection,
        cutoff: DateTime<Utc>,
    ) -> PersistenceResult<u64> {
        let result = sqlx::query("DELETE FROM transfer_keys WHERE created_at < ?")
            .bind(cutoff)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
