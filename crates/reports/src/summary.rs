//! Period summaries over the transaction ledger.
//!
//! Advisory read-side rollups: they run outside any write transaction and
//! may observe a snapshot that is a moment stale. They are never consulted
//! for a write decision - the transfer path re-checks balances itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use susu_business::{LedgerResult, LedgerService, ServiceContext};
use susu_core::{StatsPeriod, TxKind};
use susu_persistence::KindTotal;

/// Rollup of completed transactions in `[period start, now]`.
///
/// Each ledger row lands in exactly one bucket: incoming value (deposits
/// and incoming transfer legs) in `credits`, plain spending in `debits`,
/// outgoing transfer legs in `transfers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: StatsPeriod,
    pub credits: Decimal,
    pub debits: Decimal,
    pub transfers: Decimal,
    pub total_transactions: u64,
    /// `credits - debits - transfers`
    pub net_amount: Decimal,
}

impl PeriodSummary {
    fn from_totals(period: StatsPeriod, totals: &[KindTotal]) -> Self {
        let mut credits = Decimal::ZERO;
        let mut debits = Decimal::ZERO;
        let mut transfers = Decimal::ZERO;
        let mut total_transactions = 0;

        for total in totals {
            match total.kind {
                TxKind::Credit => credits += total.total,
                TxKind::Debit => debits += total.total,
                TxKind::Transfer => transfers += total.total,
            }
            total_transactions += total.count;
        }

        Self {
            period,
            credits,
            debits,
            transfers,
            total_transactions,
            net_amount: credits - debits - transfers,
        }
    }
}

/// Stats Service - dashboard rollups over the ledger
pub struct StatsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StatsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Summarize an owner's completed transactions for a period anchored
    /// at `now`.
    pub async fn summary(
        &self,
        owner_id: &str,
        period: StatsPeriod,
        now: DateTime<Utc>,
    ) -> LedgerResult<PeriodSummary> {
        let totals = LedgerService::new(self.ctx)
            .aggregate(owner_id, period, now)
            .await?;
        Ok(PeriodSummary::from_totals(period, &totals))
    }
}
