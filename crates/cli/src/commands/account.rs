//! Account management commands

use anyhow::Result;
use std::path::Path;
use susu_business::{AccountService, ServiceContext};
use susu_core::{Account, CurrencyCode};

use crate::db;
use crate::AccountAction;

/// Handle account subcommands
pub async fn handle(db_path: &Path, action: AccountAction) -> Result<()> {
    let database = db::connect(db_path).await?;
    let ctx = ServiceContext::new(&database);
    let service = AccountService::new(&ctx);

    match action {
        AccountAction::Open { owner, name, currency } => {
            let currency = currency.as_deref().map(CurrencyCode::parse).transpose()?;
            let account = service.open_account(&owner, &name, currency).await?;
            println!("Opened account for {}", account.owner_name);
            print_account(&account);
        }
        AccountAction::Show { owner } => {
            let account = service.account_of(&owner).await?;
            print_account(&account);
        }
        AccountAction::Status { owner, status } => {
            let account = service.update_status(&owner, status.to_core()).await?;
            println!("Account {} is now {}", account.account_number, account.status);
        }
    }

    database.close().await;
    Ok(())
}

fn print_account(account: &Account) {
    println!("  number:   {}", account.account_number);
    println!("  owner:    {} ({})", account.owner_name, account.owner_id);
    println!("  balance:  {} {}", account.balance, account.currency);
    println!("  status:   {}", account.status);
    match &account.last_transaction_date {
        Some(date) => println!("  last txn: {}", date.format("%Y-%m-%d %H:%M:%S")),
        None => println!("  last txn: never"),
    }
}
