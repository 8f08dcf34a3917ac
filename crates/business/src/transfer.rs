//! Value-moving operations: transfer between accounts, deposit, withdraw.
//!
//! A transfer debits the sender, credits the recipient, and appends both
//! ledger legs (sharing one transfer id) in a single SQLite transaction -
//! either all four effects commit or none do. SQLite serializes writers,
//! which gives the exclusive lock across the check-and-mutate step that
//! the balance invariant needs; a busy database surfaces as a transient
//! `WriteConflict` and is retried here a bounded number of times.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::append_entry;
use crate::services::ServiceContext;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Sqlite;
use std::time::Duration;
use susu_core::{
    Account, AccountNumber, Amount, CoreError, CounterpartySnapshot, NewTransaction, Transaction,
    TxCategory, TxKind,
};
use susu_persistence::{AccountRepo, IdempotencyRepo, PersistenceError};
use tracing::{info, warn};

/// Internal retries before a write conflict reaches the caller
const MAX_WRITE_RETRIES: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// A transfer request. `amount` is validated here; direction is implied.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub sender_owner_id: String,
    pub recipient_account_number: AccountNumber,
    pub amount: Decimal,
    pub description: String,
    /// Client-supplied token; a replayed key returns the original receipt
    /// instead of applying a second transfer.
    pub idempotency_key: Option<String>,
}

/// Canonical receipt: the sender-side leg and the post-transfer balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: String,
    pub debit: Transaction,
    pub new_sender_balance: Decimal,
}

/// Receipt for a single-leg deposit or withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReceipt {
    pub transaction: Transaction,
    pub new_balance: Decimal,
}

/// Transfer Service - the only writer that touches two accounts at once
pub struct TransferService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TransferService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Move funds between two accounts.
    ///
    /// Preconditions are checked in order, each a distinct failure:
    /// positive amount, sender exists, sufficient balance, recipient
    /// exists, sender != recipient. Both accounts must be active and
    /// share a currency.
    pub async fn transfer(&self, request: TransferRequest) -> LedgerResult<TransferReceipt> {
        let amount = Amount::positive(request.amount)
            .map_err(|_| LedgerError::validation("transfer amount must be positive"))?;

        let mut attempt = 0;
        loop {
            match self.try_transfer(&request, amount).await {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_RETRIES => {
                    attempt += 1;
                    warn!(attempt, "transfer hit write conflict, retrying");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                other => return other,
            }
        }
    }

    async fn try_transfer(
        &self,
        request: &TransferRequest,
        amount: Amount,
    ) -> LedgerResult<TransferReceipt> {
        let _guard = self.ctx.write_guard().await;
        let mut tx = self
            .ctx
            .pool()
            .begin()
            .await
            .map_err(PersistenceError::from)?;

        // Replayed key: return the original receipt, apply nothing.
        if let Some(key) = &request.idempotency_key {
            if let Some(stored) = IdempotencyRepo::get(&mut tx, key).await? {
                let receipt: TransferReceipt = serde_json::from_str(&stored.receipt)
                    .map_err(PersistenceError::from)?;
                info!(key, transfer_id = %receipt.transfer_id, "idempotent replay");
                return Ok(receipt);
            }
        }

        let sender = AccountRepo::get_by_owner(&mut tx, &request.sender_owner_id)
            .await?
            .ok_or_else(|| {
                LedgerError::not_found("sender account", &request.sender_owner_id)
            })?;

        if sender.balance < amount.value() {
            return Err(LedgerError::insufficient_funds(
                amount.value(),
                sender.balance,
            ));
        }

        let recipient =
            AccountRepo::get_by_number(&mut tx, request.recipient_account_number.as_str())
                .await?
                .ok_or_else(|| {
                    LedgerError::not_found(
                        "recipient account",
                        request.recipient_account_number.as_str(),
                    )
                })?;

        if sender.id == recipient.id {
            return Err(LedgerError::SelfTransfer);
        }

        ensure_active(&sender, "sender")?;
        ensure_active(&recipient, "recipient")?;
        if sender.currency != recipient.currency {
            return Err(CoreError::CurrencyMismatch {
                expected: sender.currency.to_string(),
                actual: recipient.currency.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let new_sender_balance = sender.balance - amount.value();
        let new_recipient_balance = recipient.balance + amount.value();
        AccountRepo::update_balance(&mut tx, &sender.id, new_sender_balance, now).await?;
        AccountRepo::update_balance(&mut tx, &recipient.id, new_recipient_balance, now).await?;

        let transfer_id = Transaction::generate_transfer_id();

        // Outgoing leg on the sender, carrying a recipient snapshot.
        let debit = append_entry(
            &mut tx,
            NewTransaction {
                owner_id: sender.owner_id.clone(),
                account_id: sender.id.clone(),
                kind: TxKind::Transfer,
                amount,
                currency: sender.currency.clone(),
                description: request.description.clone(),
                category: TxCategory::Transfer,
                counterparty: Some(CounterpartySnapshot {
                    name: recipient.owner_name.clone(),
                    account_number: recipient.account_number.clone(),
                }),
                transfer_id: Some(transfer_id.clone()),
            },
        )
        .await?;

        // Incoming leg on the recipient, carrying a sender snapshot.
        append_entry(
            &mut tx,
            NewTransaction {
                owner_id: recipient.owner_id.clone(),
                account_id: recipient.id.clone(),
                kind: TxKind::Credit,
                amount,
                currency: recipient.currency.clone(),
                description: request.description.clone(),
                category: TxCategory::Transfer,
                counterparty: Some(CounterpartySnapshot {
                    name: sender.owner_name.clone(),
                    account_number: sender.account_number.clone(),
                }),
                transfer_id: Some(transfer_id.clone()),
            },
        )
        .await?;

        let receipt = TransferReceipt {
            transfer_id: transfer_id.clone(),
            debit,
            new_sender_balance,
        };

        if let Some(key) = &request.idempotency_key {
            let receipt_json =
                serde_json::to_string(&receipt).map_err(PersistenceError::from)?;
            match IdempotencyRepo::insert(&mut tx, key, &receipt_json, now).await {
                Ok(()) => {}
                // A concurrent request with the same key won the race; this
                // whole transaction rolls back and the retry replays the
                // stored receipt.
                Err(err) if err.is_unique_violation() => {
                    return Err(LedgerError::WriteConflict);
                }
                Err(err) => return Err(err.into()),
            }
        }

        commit(tx).await?;

        info!(
            transfer_id = %receipt.transfer_id,
            sender = %sender.account_number,
            recipient = %recipient.account_number,
            amount = %amount,
            "transfer completed"
        );
        Ok(receipt)
    }

    /// Deposit external money into an account. One of the two operations
    /// that change the sum of all balances.
    pub async fn deposit(
        &self,
        owner_id: &str,
        amount: Decimal,
        description: &str,
    ) -> LedgerResult<BalanceReceipt> {
        let amount = Amount::positive(amount)
            .map_err(|_| LedgerError::validation("deposit amount must be positive"))?;

        let mut attempt = 0;
        loop {
            match self
                .apply_single_leg(owner_id, amount, TxKind::Credit, TxCategory::Deposit, description)
                .await
            {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_RETRIES => {
                    attempt += 1;
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                other => return other,
            }
        }
    }

    /// Withdraw external money from an account.
    pub async fn withdraw(
        &self,
        owner_id: &str,
        amount: Decimal,
        description: &str,
    ) -> LedgerResult<BalanceReceipt> {
        let amount = Amount::positive(amount)
            .map_err(|_| LedgerError::validation("withdrawal amount must be positive"))?;

        let mut attempt = 0;
        loop {
            match self
                .apply_single_leg(
                    owner_id,
                    amount,
                    TxKind::Debit,
                    TxCategory::Withdrawal,
                    description,
                )
                .await
            {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_RETRIES => {
                    attempt += 1;
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                other => return other,
            }
        }
    }

    async fn apply_single_leg(
        &self,
        owner_id: &str,
        amount: Amount,
        kind: TxKind,
        category: TxCategory,
        description: &str,
    ) -> LedgerResult<BalanceReceipt> {
        let _guard = self.ctx.write_guard().await;
        let mut tx = self
            .ctx
            .pool()
            .begin()
            .await
            .map_err(PersistenceError::from)?;

        let account = AccountRepo::get_by_owner(&mut tx, owner_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", owner_id))?;
        ensure_active(&account, "account")?;

        let new_balance = if kind.decreases_balance() {
            if account.balance < amount.value() {
                return Err(LedgerError::insufficient_funds(
                    amount.value(),
                    account.balance,
                ));
            }
            account.balance - amount.value()
        } else {
            account.balance + amount.value()
        };

        let now = Utc::now();
        AccountRepo::update_balance(&mut tx, &account.id, new_balance, now).await?;

        let transaction = append_entry(
            &mut tx,
            NewTransaction {
                owner_id: account.owner_id.clone(),
                account_id: account.id.clone(),
                kind,
                amount,
                currency: account.currency.clone(),
                description: description.to_string(),
                category,
                counterparty: None,
                transfer_id: None,
            },
        )
        .await?;

        commit(tx).await?;

        Ok(BalanceReceipt {
            transaction,
            new_balance,
        })
    }

    /// Trim the idempotency retention window. Returns keys removed.
    pub async fn purge_idempotency_keys(
        &self,
        before: DateTime<Utc>,
    ) -> LedgerResult<u64> {
        let mut conn = self
            .ctx
            .pool()
            .acquire()
            .await
            .map_err(PersistenceError::from)?;
        Ok(IdempotencyRepo::purge_before(&mut conn, before).await?)
    }
}

fn ensure_active(account: &Account, role: &str) -> LedgerResult<()> {
    if account.is_active() {
        Ok(())
    } else {
        Err(LedgerError::validation(format!(
            "{} account {} is {}",
            role, account.account_number, account.status
        )))
    }
}

async fn commit(tx: sqlx::Transaction<'_, Sqlite>) -> LedgerResult<()> {
    tx.commit().await.map_err(PersistenceError::from)?;
    Ok(())
}
