//! Sales bucketing (weekly / monthly / yearly)
//!
//! Pure over its inputs: the orders, the period, "now" and the business
//! timezone. Bucket boundaries are local midnights converted to Unix millis.

use crate::utils::time::{day_start_millis, local_date};
use chrono::{Datelike, Duration, Months, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    Order, PaymentBreakdown, PaymentMethod, ReportPeriod, ReportResult, SalesBucket,
};

const TRAILING_WEEKS: i64 = 12;
const TRAILING_MONTHS: u32 = 12;
const MAX_YEARS: i32 = 5;

fn record_payment(breakdown: &mut PaymentBreakdown, order: &Order) {
    let slot = match order.payment_method {
        Some(PaymentMethod::Cash) => &mut breakdown.cash,
        Some(PaymentMethod::Online) => &mut breakdown.online,
        None => &mut breakdown.unknown,
    };
    *slot += 1;
}

/// Local calendar ranges `[start, end)` with their labels, oldest first
fn calendar_ranges(
    orders: &[Order],
    period: ReportPeriod,
    today: NaiveDate,
    tz: Tz,
) -> Vec<(NaiveDate, NaiveDate, String)> {
    match period {
        ReportPeriod::Weekly => {
            let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            (0..TRAILING_WEEKS)
                .rev()
                .map(|i| {
                    let start = monday - Duration::weeks(i);
                    let label = format!("W{} {}", start.iso_week().week(), start.format("%b %d"));
                    (start, start + Duration::weeks(1), label)
                })
                .collect()
        }
        ReportPeriod::Monthly => {
            let first = today.with_day(1).unwrap_or(today);
            (0..TRAILING_MONTHS)
                .rev()
                .filter_map(|i| {
                    let start = first.checked_sub_months(Months::new(i))?;
                    let end = start.checked_add_months(Months::new(1))?;
                    Some((start, end, start.format("%b %Y").to_string()))
                })
                .collect()
        }
        ReportPeriod::Yearly => {
            let current_year = today.year();
            let first_year = orders
                .iter()
                .map(|order| local_date(order.created_at, tz).year())
                .min()
                .unwrap_or(current_year);
            let years = (current_year - first_year + 1).clamp(1, MAX_YEARS);
            (0..years)
                .rev()
                .filter_map(|i| {
                    let year = current_year - i;
                    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
                    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
                    Some((start, end, year.to_string()))
                })
                .collect()
        }
    }
}

/// Aggregate orders into trailing period buckets plus all-time totals
pub fn compute_report(orders: &[Order], period: ReportPeriod, now: i64, tz: Tz) -> ReportResult {
    let today = local_date(now, tz);
    let mut buckets: Vec<SalesBucket> = calendar_ranges(orders, period, today, tz)
        .into_iter()
        .map(|(start, end, label)| SalesBucket {
            label,
            start: day_start_millis(start, tz),
            end: day_start_millis(end, tz),
            total_sales: Decimal::ZERO,
            order_count: 0,
            payments: PaymentBreakdown::default(),
        })
        .collect();

    let mut total_sales = Decimal::ZERO;
    let mut payments = PaymentBreakdown::default();
    for order in orders {
        total_sales += order.total_amount;
        record_payment(&mut payments, order);

        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.start <= order.created_at && order.created_at < b.end)
        {
            bucket.total_sales += order.total_amount;
            bucket.order_count += 1;
            record_payment(&mut bucket.payments, order);
        }
    }

    let total_orders = orders.len() as u64;
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        (total_sales / Decimal::from(total_orders)).round_dp(2)
    };

    ReportResult {
        period,
        buckets,
        total_sales,
        total_orders,
        average_order_value,
        payments,
        generated_at: now,
    }
}
