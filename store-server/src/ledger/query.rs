//! Order query filtering applied after the date-range fetch

use crate::utils::time::{day_end_millis, day_start_millis};
use chrono_tz::Tz;
use shared::models::{Order, OrderFilter, SortDirection};

/// Inclusive `created_at` bounds for a filter's date range
pub fn date_bounds(filter: &OrderFilter, tz: Tz) -> (i64, i64) {
    let from = filter
        .start_date
        .map(|d| day_start_millis(d, tz))
        .unwrap_or(i64::MIN);
    let to = filter
        .end_date
        .map(|d| day_end_millis(d, tz))
        .unwrap_or(i64::MAX);
    (from, to)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn term(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

/// Human-facing field filters (number, buyer name, phone, city)
pub fn matches(order: &Order, filter: &OrderFilter) -> bool {
    if let Some(number) = term(&filter.order_number)
        && !contains_ci(&order.order_number, number)
    {
        return false;
    }

    let buyer = order.buyer.as_ref();
    if let Some(name) = term(&filter.buyer_name)
        && !buyer.is_some_and(|b| contains_ci(&b.buyer_name, name))
    {
        return false;
    }
    if let Some(phone) = term(&filter.buyer_phone)
        && !buyer.is_some_and(|b| b.buyer_phone.contains(phone))
    {
        return false;
    }
    if let Some(city) = term(&filter.city)
        && !buyer.is_some_and(|b| b.city == city)
    {
        return false;
    }
    true
}

/// Order by creation time (newest first unless asked otherwise) and apply the limit
pub fn sort_and_limit(mut orders: Vec<Order>, filter: &OrderFilter) -> Vec<Order> {
    orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    if filter.direction.unwrap_or(SortDirection::Desc) == SortDirection::Desc {
        orders.reverse();
    }
    if let Some(limit) = filter.limit {
        orders.truncate(limit);
    }
    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::models::{BuyerInfo, OrderStream};

    fn invoice(number: &str, name: &str, phone: &str, city: &str, created_at: i64) -> Order {
        Order {
            id: number.to_lowercase(),
            order_number: number.to_string(),
            stream: OrderStream::Franchise,
            items: vec![],
            total_amount: Decimal::ZERO,
            created_at,
            payment_method: None,
            buyer: Some(BuyerInfo {
                buyer_name: name.to_string(),
                buyer_phone: phone.to_string(),
                city: city.to_string(),
            }),
        }
    }

    #[test]
    fn test_date_bounds_cover_whole_end_day() {
        let filter = OrderFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        let (from, to) = date_bounds(&filter, chrono_tz::UTC);
        assert_eq!(from, 1_704_067_200_000);
        assert_eq!(to, 1_704_153_599_999);

        let (from, to) = date_bounds(&OrderFilter::default(), chrono_tz::UTC);
        assert_eq!((from, to), (i64::MIN, i64::MAX));
    }

    #[test]
    fn test_field_filters() {
        let order = invoice("FINV-0001", "Kadapa Franchise Store", "9876543210", "Kadapa", 1);

        let by_name = OrderFilter {
            buyer_name: Some("kadapa franchise".into()),
            ..Default::default()
        };
        assert!(matches(&order, &by_name));

        let by_phone = OrderFilter {
            buyer_phone: Some("6543".into()),
            ..Default::default()
        };
        assert!(matches(&order, &by_phone));

        let by_number = OrderFilter {
            order_number: Some("finv-00".into()),
            ..Default::default()
        };
        assert!(matches(&order, &by_number));

        // City is an exact match
        let by_city = OrderFilter {
            city: Some("kadapa".into()),
            ..Default::default()
        };
        assert!(!matches(&order, &by_city));
    }

    #[test]
    fn test_buyer_filters_exclude_standard_orders() {
        let mut order = invoice("ORD-0001", "", "", "", 1);
        order.buyer = None;
        let filter = OrderFilter {
            buyer_name: Some("x".into()),
            ..Default::default()
        };
        assert!(!matches(&order, &filter));
        assert!(matches(&order, &OrderFilter::default()));
    }

    #[test]
    fn test_sort_and_limit() {
        let orders = vec![
            invoice("FINV-0001", "a", "1", "c", 10),
            invoice("FINV-0002", "a", "1", "c", 30),
            invoice("FINV-0003", "a", "1", "c", 20),
        ];
        let newest: Vec<String> = sort_and_limit(
            orders.clone(),
            &OrderFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .into_iter()
        .map(|o| o.order_number)
        .collect();
        assert_eq!(newest, vec!["FINV-0002", "FINV-0003"]);

        let oldest = sort_and_limit(
            orders,
            &OrderFilter {
                direction: Some(SortDirection::Asc),
                ..Default::default()
            },
        );
        assert_eq!(oldest[0].order_number, "FINV-0001");
    }
}
