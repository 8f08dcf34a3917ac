//! Repository integration tests against a throwaway SQLite file.

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use susu_core::{
    Account, AccountNumber, AccountStatus, Amount, CurrencyCode, NewTransaction, Reference,
    Transaction, TxCategory, TxKind, TxStatus,
};
use susu_persistence::{
    AccountRepo, Database, IdempotencyRepo, Page, PersistenceError, TransactionFilter,
    TransactionRepo,
};
use tempfile::TempDir;

async fn test_db() -> (TempDir, Database) {
    let dir = TempDir::new().expect("tempdir");
    let db = Database::open(dir.path().join("susu.db"))
        .await
        .expect("open db");
    (dir, db)
}

fn account(owner: &str, seq: u64) -> Account {
    Account::new(
        owner,
        &format!("Owner {owner}"),
        AccountNumber::from_sequence(seq).unwrap(),
        CurrencyCode::ghs(),
    )
}

fn tx_for(account: &Account, kind: TxKind, amount: rust_decimal::Decimal) -> Transaction {
    let new = NewTransaction {
        owner_id: account.owner_id.clone(),
        account_id: account.id.clone(),
        kind,
        amount: Amount::positive(amount).unwrap(),
        currency: account.currency.clone(),
        description: format!("{kind} of {amount}"),
        category: TxCategory::Other,
        counterparty: None,
        transfer_id: None,
    };
    Transaction {
        id: Transaction::generate_id(),
        owner_id: new.owner_id,
        account_id: new.account_id,
        kind: new.kind,
        amount: new.amount,
        currency: new.currency,
        description: new.description,
        reference: Reference::generate(Utc::now()),
        status: TxStatus::Completed,
        category: new.category,
        counterparty: new.counterparty,
        transfer_id: new.transfer_id,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn account_insert_and_lookup() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let account = account("OWN_001", 1);
    AccountRepo::insert(&mut conn, &account).await.unwrap();

    let by_owner = AccountRepo::get_by_owner(&mut conn, "OWN_001")
        .await
        .unwrap()
        .expect("account exists");
    assert_eq!(by_owner.account_number.as_str(), "GH0000000001");
    assert_eq!(by_owner.balance, dec!(0));

    let by_number = AccountRepo::get_by_number(&mut conn, "GH0000000001")
        .await
        .unwrap()
        .expect("account exists");
    assert_eq!(by_number.owner_id, "OWN_001");

    assert!(AccountRepo::get_by_number(&mut conn, "GH9999999999")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn duplicate_owner_is_unique_violation() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    AccountRepo::insert(&mut conn, &account("OWN_001", 1))
        .await
        .unwrap();
    let err = AccountRepo::insert(&mut conn, &account("OWN_001", 2))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
    assert!(err.violates("accounts.owner_id"));
}

#[tokio::test]
async fn account_sequence_is_monotonic() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let first = AccountRepo::next_account_sequence(&mut conn).await.unwrap();
    let second = AccountRepo::next_account_sequence(&mut conn).await.unwrap();
    let third = AccountRepo::next_account_sequence(&mut conn).await.unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(third, 3);
}

#[tokio::test]
async fn balance_update_bumps_last_transaction_date() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let account = account("OWN_001", 1);
    AccountRepo::insert(&mut conn, &account).await.unwrap();

    let at = Utc::now();
    AccountRepo::update_balance(&mut conn, &account.id, dec!(1150.00), at)
        .await
        .unwrap();

    let stored = AccountRepo::get_by_id(&mut conn, &account.id).await.unwrap();
    assert_eq!(stored.balance, dec!(1150.00));
    assert!(stored.last_transaction_date.is_some());
}

#[tokio::test]
async fn update_balance_of_missing_account_is_not_found() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let err = AccountRepo::update_balance(&mut conn, "ACC_missing", dec!(1), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_reference_is_unique_violation() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let account = account("OWN_001", 1);
    AccountRepo::insert(&mut conn, &account).await.unwrap();

    let tx = tx_for(&account, TxKind::Credit, dec!(10));
    TransactionRepo::insert(&mut conn, &tx).await.unwrap();

    let mut dup = tx_for(&account, TxKind::Credit, dec!(20));
    dup.reference = tx.reference.clone();
    let err = TransactionRepo::insert(&mut conn, &dup).await.unwrap_err();
    assert!(err.violates("transactions.reference"));
}

#[tokio::test]
async fn query_filters_and_paginates_newest_first() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let account = account("OWN_001", 1);
    AccountRepo::insert(&mut conn, &account).await.unwrap();

    let base = Utc::now();
    for i in 0..5 {
        let kind = if i % 2 == 0 {
            TxKind::Credit
        } else {
            TxKind::Debit
        };
        let mut tx = tx_for(&account, kind, dec!(10) + rust_decimal::Decimal::from(i));
        tx.created_at = base + Duration::seconds(i);
        TransactionRepo::insert(&mut conn, &tx).await.unwrap();
    }

    let all = TransactionRepo::query(
        &mut conn,
        "OWN_001",
        &TransactionFilter::default(),
        Page::new(1, 10),
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 5);
    // newest first
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let credits = TransactionRepo::query(
        &mut conn,
        "OWN_001",
        &TransactionFilter {
            kind: Some(TxKind::Credit),
            ..Default::default()
        },
        Page::new(1, 10),
    )
    .await
    .unwrap();
    assert_eq!(credits.len(), 3);
    assert!(credits.iter().all(|t| t.kind == TxKind::Credit));

    let page2 = TransactionRepo::query(
        &mut conn,
        "OWN_001",
        &TransactionFilter::default(),
        Page::new(2, 2),
    )
    .await
    .unwrap();
    assert_eq!(page2.len(), 2);
    assert_eq!(page2[0].created_at, all[2].created_at);
}

#[tokio::test]
async fn aggregate_ignores_non_completed_and_old_rows() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let account = account("OWN_001", 1);
    AccountRepo::insert(&mut conn, &account).await.unwrap();

    let mut credit = tx_for(&account, TxKind::Credit, dec!(500));
    credit.category = TxCategory::Deposit;
    TransactionRepo::insert(&mut conn, &credit).await.unwrap();

    let mut debit = tx_for(&account, TxKind::Debit, dec!(100));
    debit.category = TxCategory::Withdrawal;
    TransactionRepo::insert(&mut conn, &debit).await.unwrap();

    let mut pending = tx_for(&account, TxKind::Debit, dec!(999));
    pending.status = TxStatus::Pending;
    TransactionRepo::insert(&mut conn, &pending).await.unwrap();

    let mut stale = tx_for(&account, TxKind::Credit, dec!(777));
    stale.created_at = Utc::now() - Duration::days(60);
    TransactionRepo::insert(&mut conn, &stale).await.unwrap();

    let since = Utc::now() - Duration::days(30);
    let totals = TransactionRepo::aggregate(&mut conn, "OWN_001", since)
        .await
        .unwrap();

    let credit_total = totals.iter().find(|t| t.kind == TxKind::Credit).unwrap();
    assert_eq!(credit_total.total, dec!(500));
    assert_eq!(credit_total.count, 1);

    let debit_total = totals.iter().find(|t| t.kind == TxKind::Debit).unwrap();
    assert_eq!(debit_total.total, dec!(100));
    assert_eq!(debit_total.count, 1);

    assert!(totals.iter().all(|t| t.kind != TxKind::Transfer));
}

#[tokio::test]
async fn transfer_legs_share_transfer_id() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let a = account("OWN_001", 1);
    let b = account("OWN_002", 2);
    AccountRepo::insert(&mut conn, &a).await.unwrap();
    AccountRepo::insert(&mut conn, &b).await.unwrap();

    let transfer_id = Transaction::generate_transfer_id();
    let mut out_leg = tx_for(&a, TxKind::Transfer, dec!(50));
    out_leg.transfer_id = Some(transfer_id.clone());
    let mut in_leg = tx_for(&b, TxKind::Credit, dec!(50));
    in_leg.transfer_id = Some(transfer_id.clone());
    TransactionRepo::insert(&mut conn, &out_leg).await.unwrap();
    TransactionRepo::insert(&mut conn, &in_leg).await.unwrap();

    let legs = TransactionRepo::get_by_transfer_id(&mut conn, &transfer_id)
        .await
        .unwrap();
    assert_eq!(legs.len(), 2);
    assert_ne!(legs[0].reference, legs[1].reference);
    assert_eq!(legs[0].amount, legs[1].amount);
}

#[tokio::test]
async fn idempotency_keys_round_trip_and_purge() {
    let (_dir, db) = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let now = Utc::now();
    IdempotencyRepo::insert(&mut conn, "key-1", r#"{"ok":true}"#, now)
        .await
        .unwrap();

    let row = IdempotencyRepo::get(&mut conn, "key-1")
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(row.receipt, r#"{"ok":true}"#);

    let err = IdempotencyRepo::insert(&mut conn, "key-1", "{}", now)
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let purged = IdempotencyRepo::purge_before(&mut conn, now + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(purged, 1);
    assert!(IdempotencyRepo::get(&mut conn, "key-1")
        .await
        .unwrap()
        .is_none());
}
