//! Sales reports over the order ledger

pub mod buckets;

pub use buckets::compute_report;

use crate::ledger::OrderLedger;
use crate::stock::StockResult;
use shared::models::{ReportPeriod, ReportResult, StreamSelector};
use shared::util::now_millis;

/// Computes reports on demand (no caching)
#[derive(Clone)]
pub struct ReportService {
    ledger: OrderLedger,
}

impl ReportService {
    pub fn new(ledger: OrderLedger) -> Self {
        Self { ledger }
    }

    pub fn compute(&self, period: ReportPeriod, selector: StreamSelector) -> StockResult<ReportResult> {
        let orders = self.ledger.all_ascending(selector)?;
        tracing::debug!(period = ?period, selector = ?selector, orders = orders.len(), "Computing report");
        Ok(compute_report(&orders, period, now_millis(), self.ledger.timezone()))
    }
}
