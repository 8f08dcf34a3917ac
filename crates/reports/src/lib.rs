//! # Susu Reports
//!
//! Read-side statistics over the transaction ledger, exposed for
//! dashboard consumption.
//!
//! ## Example
//!
//! ```rust,ignore
//! use susu_core::StatsPeriod;
//! use susu_reports::StatsService;
//!
//! let stats = StatsService::new(&ctx);
//! let summary = stats.summary("OWN_001", StatsPeriod::Month, Utc::now()).await?;
//! println!("net this month: {}", summary.net_amount);
//! ```

pub mod summary;

pub use summary::{PeriodSummary, StatsService};
