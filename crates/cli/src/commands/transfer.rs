//! Money movement commands: deposit, withdraw, transfer

use anyhow::Result;
use rust_decimal::Decimal;
use std::path::Path;
use susu_business::{ServiceContext, TransferRequest, TransferService};
use susu_core::AccountNumber;

use crate::db;

/// Deposit external funds into an owner's account
pub async fn deposit(db_path: &Path, owner: &str, amount: Decimal, description: &str) -> Result<()> {
    let database = db::connect(db_path).await?;
    let ctx = ServiceContext::new(&database);
    let service = TransferService::new(&ctx);

    let receipt = service.deposit(owner, amount, description).await?;
    println!("Deposited {} into {}", amount, owner);
    println!("  reference:   {}", receipt.transaction.reference);
    println!("  new balance: {}", receipt.new_balance);

    database.close().await;
    Ok(())
}

/// Withdraw funds from an owner's account
pub async fn withdraw(
    db_path: &Path,
    owner: &str,
    amount: Decimal,
    description: &str,
) -> Result<()> {
    let database = db::connect(db_path).await?;
    let ctx = ServiceContext::new(&database);
    let service = TransferService::new(&ctx);

    let receipt = service.withdraw(owner, amount, description).await?;
    println!("Withdrew {} from {}", amount, owner);
    println!("  reference:   {}", receipt.transaction.reference);
    println!("  new balance: {}", receipt.new_balance);

    database.close().await;
    Ok(())
}

/// Transfer funds to another account, atomically
pub async fn transfer(
    db_path: &Path,
    owner: &str,
    recipient: &str,
    amount: Decimal,
    description: &str,
    idempotency_key: Option<String>,
) -> Result<()> {
    let recipient_account_number = AccountNumber::parse(recipient)?;

    let database = db::connect(db_path).await?;
    let ctx = ServiceContext::new(&database);
    let service = TransferService::new(&ctx);

    let receipt = service
        .transfer(TransferRequest {
            sender_owner_id: owner.to_string(),
            recipient_account_number,
            amount,
            description: description.to_string(),
            idempotency_key,
        })
        .await?;

    println!("Transferred {} to {}", amount, recipient);
    println!("  transfer id: {}", receipt.transfer_id);
    println!("  reference:   {}", receipt.debit.reference);
    println!("  new balance: {}", receipt.new_sender_balance);

    database.close().await;
    Ok(())
}
