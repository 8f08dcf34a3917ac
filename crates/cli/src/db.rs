//! Database initialization and status

use anyhow::{Context, Result};
use std::path::Path;
use susu_persistence::{AccountRepo, Database};

/// Initialize the database (migrations run on connect)
pub async fn init_database(db_path: &Path, force: bool) -> Result<()> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        println!("Removed existing database");
    }

    let db = Database::open(db_path)
        .await
        .context("Failed to initialize database")?;
    db.close().await;

    println!("Database ready at {}", db_path.display());
    Ok(())
}

/// Show database status
pub async fn show_status(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        println!("Database not found at {}", db_path.display());
        println!("Run 'susu init' to create it");
        return Ok(());
    }

    let db = Database::open(db_path).await?;
    let mut conn = db.pool().acquire().await?;

    let (accounts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(&mut *conn)
        .await?;
    let (transactions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
        .fetch_one(&mut *conn)
        .await?;
    let total = AccountRepo::sum_balances(&mut conn).await?;

    println!("Database: {}", db_path.display());
    println!("  accounts:       {accounts}");
    println!("  transactions:   {transactions}");
    println!("  total balances: {total}");

    db.close().await;
    Ok(())
}

/// Connect for command handlers
pub async fn connect(db_path: &Path) -> Result<Database> {
    Database::open(db_path)
        .await
        .context("Failed to open database; run 'susu init' first")
}
