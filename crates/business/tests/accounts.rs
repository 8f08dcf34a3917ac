//! Account lifecycle tests: onboarding, uniqueness, status machine,
//! and ledger history validation.

use rust_decimal_macros::dec;
use susu_business::{AccountService, LedgerError, LedgerService, ServiceContext, TransferService};
use susu_core::{
    AccountStatus, Amount, CurrencyCode, NewTransaction, TxCategory, TxKind, TxStatus,
};
use susu_persistence::{Database, Page, TransactionFilter};
use tempfile::TempDir;

async fn ctx() -> (TempDir, ServiceContext) {
    let dir = TempDir::new().expect("tempdir");
    let db = Database::open(dir.path().join("susu.db"))
        .await
        .expect("open db");
    let ctx = ServiceContext::new(&db);
    (dir, ctx)
}

#[tokio::test]
async fn open_account_allocates_sequential_numbers() {
    let (_dir, ctx) = ctx().await;
    let accounts = AccountService::new(&ctx);

    let first = accounts
        .open_account("alice", "Alice Owusu", None)
        .await
        .unwrap();
    let second = accounts
        .open_account("bob", "Bob Mensah", None)
        .await
        .unwrap();

    assert_eq!(first.account_number.as_str(), "GH0000000001");
    assert_eq!(second.account_number.as_str(), "GH0000000002");
    assert_eq!(first.balance, dec!(0));
    assert_eq!(first.currency.as_str(), "GHS");
    assert_eq!(first.status, AccountStatus::Active);
}

#[tokio::test]
async fn one_account_per_owner() {
    let (_dir, ctx) = ctx().await;
    let accounts = AccountService::new(&ctx);

    accounts
        .open_account("alice", "Alice Owusu", None)
        .await
        .unwrap();
    let err = accounts
        .open_account("alice", "Alice Again", Some(CurrencyCode::parse("USD").unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists(_)));
}

#[tokio::test]
async fn blank_identifiers_are_rejected() {
    let (_dir, ctx) = ctx().await;
    let accounts = AccountService::new(&ctx);

    assert!(matches!(
        accounts.open_account("  ", "Alice", None).await.unwrap_err(),
        LedgerError::Validation(_)
    ));
    assert!(matches!(
        accounts.open_account("alice", "", None).await.unwrap_err(),
        LedgerError::Validation(_)
    ));
}

#[tokio::test]
async fn closed_is_terminal() {
    let (_dir, ctx) = ctx().await;
    let accounts = AccountService::new(&ctx);

    accounts
        .open_account("alice", "Alice Owusu", None)
        .await
        .unwrap();

    accounts
        .update_status("alice", AccountStatus::Suspended)
        .await
        .unwrap();
    accounts
        .update_status("alice", AccountStatus::Closed)
        .await
        .unwrap();

    let err = accounts
        .update_status("alice", AccountStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let stored = accounts.account_of("alice").await.unwrap();
    assert_eq!(stored.status, AccountStatus::Closed);
}

#[tokio::test]
async fn lookup_by_number_and_owner_agree() {
    let (_dir, ctx) = ctx().await;
    let accounts = AccountService::new(&ctx);

    let opened = accounts
        .open_account("alice", "Alice Owusu", None)
        .await
        .unwrap();
    let by_number = accounts
        .account_by_number(&opened.account_number)
        .await
        .unwrap();
    assert_eq!(by_number.id, opened.id);

    let err = accounts.account_of("nobody").await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[tokio::test]
async fn record_appends_a_completed_entry() {
    let (_dir, ctx) = ctx().await;
    let account = AccountService::new(&ctx)
        .open_account("alice", "Alice Owusu", None)
        .await
        .unwrap();

    let ledger = LedgerService::new(&ctx);
    let entry = ledger
        .record(NewTransaction {
            owner_id: account.owner_id.clone(),
            account_id: account.id.clone(),
            kind: TxKind::Debit,
            amount: Amount::positive(dec!(35.50)).unwrap(),
            currency: account.currency.clone(),
            description: "electricity bill".to_string(),
            category: TxCategory::Bill,
            counterparty: None,
            transfer_id: None,
        })
        .await
        .unwrap();

    assert_eq!(entry.status, TxStatus::Completed);
    assert!(entry.reference.as_str().starts_with("TXN"));

    let bills = ledger
        .history(
            "alice",
            &TransactionFilter {
                category: Some(TxCategory::Bill),
                ..Default::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].reference, entry.reference);
}

#[tokio::test]
async fn history_rejects_degenerate_pagination() {
    let (_dir, ctx) = ctx().await;
    AccountService::new(&ctx)
        .open_account("alice", "Alice Owusu", None)
        .await
        .unwrap();
    TransferService::new(&ctx)
        .deposit("alice", dec!(25), "seed")
        .await
        .unwrap();

    let ledger = LedgerService::new(&ctx);
    for page in [Page::new(0, 10), Page::new(1, 0), Page::new(1, 1000)] {
        let err = ledger
            .history("alice", &TransactionFilter::default(), page)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    let ok = ledger
        .history("alice", &TransactionFilter::default(), Page::new(1, 10))
        .await
        .unwrap();
    assert_eq!(ok.len(), 1);
}
