//! Susu CLI - ledger operations from the command line
//!
//! Usage:
//! ```bash
//! susu account open --owner alice --name "Alice Owusu"
//! susu deposit alice 500.00
//! susu transfer alice GH0000000002 50.00 --description "rent share"
//! susu history alice --kind transfer --page 1 --limit 20
//! susu stats alice --period month
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

mod commands;
mod db;

use commands::{account, stats, transfer};

/// Susu - a microfinance account and transaction ledger
#[derive(Parser)]
#[command(name = "susu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/susu.db", global = true)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Account management
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Deposit external funds into an account
    Deposit {
        /// Owner id
        owner: String,
        /// Amount to deposit
        amount: Decimal,
        /// Description for the ledger entry
        #[arg(long, default_value = "cash deposit")]
        description: String,
    },

    /// Withdraw funds from an account
    Withdraw {
        /// Owner id
        owner: String,
        /// Amount to withdraw
        amount: Decimal,
        /// Description for the ledger entry
        #[arg(long, default_value = "cash withdrawal")]
        description: String,
    },

    /// Transfer funds to another account
    Transfer {
        /// Sender owner id
        owner: String,
        /// Recipient account number (GH + 10 digits)
        recipient: String,
        /// Amount to transfer
        amount: Decimal,
        /// Description carried on both legs
        #[arg(long, default_value = "transfer")]
        description: String,
        /// Idempotency key: replaying the same key applies the transfer once
        #[arg(long)]
        idempotency_key: Option<String>,
    },

    /// Transaction history, newest first
    History {
        /// Owner id
        owner: String,
        /// Filter by kind
        #[arg(long)]
        kind: Option<TxKindArg>,
        /// Filter by category
        #[arg(long)]
        category: Option<TxCategoryArg>,
        /// 1-based page
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Period statistics for dashboards
    Stats {
        /// Owner id
        owner: String,
        /// Aggregation period
        #[arg(long, default_value = "month")]
        period: PeriodArg,
    },

    /// Initialize the database
    Init {
        /// Force re-initialization (drops existing data)
        #[arg(long)]
        force: bool,
    },

    /// Show database status
    Status,
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Open an account for an owner
    Open {
        /// Owner id
        #[arg(long)]
        owner: String,
        /// Owner display name
        #[arg(long)]
        name: String,
        /// Currency code (defaults to GHS)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Show an account
    Show {
        /// Owner id
        owner: String,
    },
    /// Change account status (closed is terminal)
    Status {
        /// Owner id
        owner: String,
        /// New status
        status: StatusArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Suspended,
    Closed,
}

impl StatusArg {
    pub fn to_core(self) -> susu_core::AccountStatus {
        match self {
            StatusArg::Active => susu_core::AccountStatus::Active,
            StatusArg::Suspended => susu_core::AccountStatus::Suspended,
            StatusArg::Closed => susu_core::AccountStatus::Closed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TxKindArg {
    Credit,
    Debit,
    Transfer,
}

impl TxKindArg {
    pub fn to_core(self) -> susu_core::TxKind {
        match self {
            TxKindArg::Credit => susu_core::TxKind::Credit,
            TxKindArg::Debit => susu_core::TxKind::Debit,
            TxKindArg::Transfer => susu_core::TxKind::Transfer,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TxCategoryArg {
    Transfer,
    Payment,
    Deposit,
    Withdrawal,
    Bill,
    Airtime,
    Data,
    Other,
}

impl TxCategoryArg {
    pub fn to_core(self) -> susu_core::TxCategory {
        match self {
            TxCategoryArg::Transfer => susu_core::TxCategory::Transfer,
            TxCategoryArg::Payment => susu_core::TxCategory::Payment,
            TxCategoryArg::Deposit => susu_core::TxCategory::Deposit,
            TxCategoryArg::Withdrawal => susu_core::TxCategory::Withdrawal,
            TxCategoryArg::Bill => susu_core::TxCategory::Bill,
            TxCategoryArg::Airtime => susu_core::TxCategory::Airtime,
            TxCategoryArg::Data => susu_core::TxCategory::Data,
            TxCategoryArg::Other => susu_core::TxCategory::Other,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodArg {
    pub fn to_core(self) -> susu_core::StatsPeriod {
        match self {
            PeriodArg::Day => susu_core::StatsPeriod::Day,
            PeriodArg::Week => susu_core::StatsPeriod::Week,
            PeriodArg::Month => susu_core::StatsPeriod::Month,
            PeriodArg::Year => susu_core::StatsPeriod::Year,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Some(parent) = cli.db.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    match cli.command {
        Commands::Init { force } => {
            db::init_database(&cli.db, force).await?;
        }
        Commands::Status => {
            db::show_status(&cli.db).await?;
        }
        Commands::Account { action } => {
            account::handle(&cli.db, action).await?;
        }
        Commands::Deposit {
            owner,
            amount,
            description,
        } => {
            transfer::deposit(&cli.db, &owner, amount, &description).await?;
        }
        Commands::Withdraw {
            owner,
            amount,
            description,
        } => {
            transfer::withdraw(&cli.db, &owner, amount, &description).await?;
        }
        Commands::Transfer {
            owner,
            recipient,
            amount,
            description,
            idempotency_key,
        } => {
            transfer::transfer(&cli.db, &owner, &recipient, amount, &description, idempotency_key)
                .await?;
        }
        Commands::History {
            owner,
            kind,
            category,
            page,
            limit,
        } => {
            stats::history(&cli.db, &owner, kind, category, page, limit).await?;
        }
        Commands::Stats { owner, period } => {
            stats::stats(&cli.db, &owner, period).await?;
        }
    }

    Ok(())
}
