//! Sales Report Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    Weekly,
    Monthly,
    Yearly,
}

/// Order counts by payment method; orders without one count as `unknown`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub cash: u64,
    pub online: u64,
    pub unknown: u64,
}

/// One period bucket (a week, a month or a year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesBucket {
    pub label: String,
    /// Bucket start, Unix millis
    pub start: i64,
    /// Bucket end (exclusive), Unix millis
    pub end: i64,
    pub total_sales: Decimal,
    pub order_count: u64,
    pub payments: PaymentBreakdown,
}

/// Report result: trailing buckets (oldest first) plus all-time summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub period: ReportPeriod,
    pub buckets: Vec<SalesBucket>,
    pub total_sales: Decimal,
    pub total_orders: u64,
    /// 0 when there are no orders
    pub average_order_value: Decimal,
    pub payments: PaymentBreakdown,
    /// Unix millis
    pub generated_at: i64,
}
