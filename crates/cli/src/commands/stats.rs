//! Read-side commands: history and period statistics

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use susu_business::{LedgerService, ServiceContext};
use susu_core::Transaction;
use susu_persistence::{Page, TransactionFilter};
use susu_reports::StatsService;

use crate::db;
use crate::{PeriodArg, TxCategoryArg, TxKindArg};

/// Print an owner's transaction history, newest first
pub async fn history(
    db_path: &Path,
    owner: &str,
    kind: Option<TxKindArg>,
    category: Option<TxCategoryArg>,
    page: u32,
    limit: u32,
) -> Result<()> {
    let database = db::connect(db_path).await?;
    let ctx = ServiceContext::new(&database);
    let service = LedgerService::new(&ctx);

    let filter = TransactionFilter {
        kind: kind.map(TxKindArg::to_core),
        category: category.map(TxCategoryArg::to_core),
    };
    let entries = service.history(owner, &filter, Page::new(page, limit)).await?;

    if entries.is_empty() {
        println!("No transactions on page {page}");
    } else {
        println!("Transactions for {owner} (page {page}):");
        for entry in &entries {
            print_entry(entry);
        }
    }

    database.close().await;
    Ok(())
}

fn print_entry(entry: &Transaction) {
    let counterparty = entry
        .counterparty
        .as_ref()
        .map(|cp| format!(" <-> {} ({})", cp.account_number, cp.name))
        .unwrap_or_default();
    println!(
        "  {} {:8} {} {} [{}] {}{}",
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.kind.as_str(),
        entry.amount,
        entry.currency,
        entry.reference,
        entry.description,
        counterparty,
    );
}

/// Print period statistics for an owner
pub async fn stats(db_path: &Path, owner: &str, period: PeriodArg) -> Result<()> {
    let database = db::connect(db_path).await?;
    let ctx = ServiceContext::new(&database);
    let service = StatsService::new(&ctx);

    let summary = service.summary(owner, period.to_core(), Utc::now()).await?;

    println!("Stats for {owner} ({}):", summary.period);
    println!("  credits:      {}", summary.credits);
    println!("  debits:       {}", summary.debits);
    println!("  transfers:    {}", summary.transfers);
    println!("  transactions: {}", summary.total_transactions);
    println!("  net:          {}", summary.net_amount);

    database.close().await;
    Ok(())
}
