//! Account operations - onboarding, lookup, status management.
//!
//! Account numbers come from a persistent monotonic sequence consumed in
//! the same transaction that inserts the account, so allocation is
//! collision-free by construction. The UNIQUE constraints on owner and
//! number remain as a backstop.

use crate::error::{LedgerError, LedgerResult};
use crate::services::ServiceContext;
use susu_core::{Account, AccountNumber, AccountStatus, CurrencyCode};
use susu_persistence::{AccountRepo, PersistenceError};
use tracing::info;

/// Account Service - creation, lookup, status transitions
pub struct AccountService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccountService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open the one account an owner may hold.
    ///
    /// Fails with `AlreadyExists` if the owner already has an account and
    /// `GenerationExhausted` if the 10-digit number space is used up.
    pub async fn open_account(
        &self,
        owner_id: &str,
        owner_name: &str,
        currency: Option<CurrencyCode>,
    ) -> LedgerResult<Account> {
        if owner_id.trim().is_empty() {
            return Err(LedgerError::validation("owner id must not be empty"));
        }
        if owner_name.trim().is_empty() {
            return Err(LedgerError::validation("owner name must not be empty"));
        }

        let _guard = self.ctx.write_guard().await;
        let mut tx = self
            .ctx
            .pool()
            .begin()
            .await
            .map_err(PersistenceError::from)?;

        if AccountRepo::get_by_owner(&mut tx, owner_id).await?.is_some() {
            return Err(LedgerError::AlreadyExists(owner_id.to_string()));
        }

        let seq = AccountRepo::next_account_sequence(&mut tx).await?;
        let number = AccountNumber::from_sequence(seq)?;
        let account = Account::new(
            owner_id,
            owner_name,
            number,
            currency.unwrap_or_default(),
        );

        match AccountRepo::insert(&mut tx, &account).await {
            Ok(()) => {}
            // Two concurrent opens for one owner: the loser sees the
            // constraint, not a race.
            Err(err) if err.violates("accounts.owner_id") => {
                return Err(LedgerError::AlreadyExists(owner_id.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit().await.map_err(PersistenceError::from)?;

        info!(
            owner_id,
            account_number = %account.account_number,
            "account opened"
        );
        Ok(account)
    }

    /// Look up the caller's account.
    pub async fn account_of(&self, owner_id: &str) -> LedgerResult<Account> {
        let mut conn = self
            .ctx
            .pool()
            .acquire()
            .await
            .map_err(PersistenceError::from)?;
        AccountRepo::get_by_owner(&mut conn, owner_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", owner_id))
    }

    /// Resolve an account by its public number.
    pub async fn account_by_number(&self, number: &AccountNumber) -> LedgerResult<Account> {
        let mut conn = self
            .ctx
            .pool()
            .acquire()
            .await
            .map_err(PersistenceError::from)?;
        AccountRepo::get_by_number(&mut conn, number.as_str())
            .await?
            .ok_or_else(|| LedgerError::not_found("account", number.as_str()))
    }

    /// Administrative status change, validated against the state machine
    /// (Closed is terminal).
    pub async fn update_status(
        &self,
        owner_id: &str,
        new_status: AccountStatus,
    ) -> LedgerResult<Account> {
        let _guard = self.ctx.write_guard().await;
        let mut tx = self
            .ctx
            .pool()
            .begin()
            .await
            .map_err(PersistenceError::from)?;

        let mut account = AccountRepo::get_by_owner(&mut tx, owner_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", owner_id))?;

        account.transition_status(new_status)?;
        AccountRepo::update_status(&mut tx, &account.id, account.status).await?;

        tx.commit().await.map_err(PersistenceError::from)?;

        info!(owner_id, status = %account.status, "account status updated");
        Ok(account)
    }
}
