//! Catalog listing: matching, ordering, capping

use shared::models::{SortDirection, StockFilter, StockItem, StockSortField};
use std::cmp::Ordering;

/// Unscoped listings return at most this many items unless the caller sets a limit
pub const DEFAULT_LIST_CAP: usize = 500;

fn matches(item: &StockItem, name_term: Option<&str>, barcode: Option<&str>) -> bool {
    if let Some(term) = name_term
        && !item.name.to_lowercase().contains(term)
    {
        return false;
    }
    barcode.is_none_or(|code| item.barcode == code)
}

fn compare(a: &StockItem, b: &StockItem, field: StockSortField) -> Ordering {
    let primary = match field {
        StockSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        StockSortField::Price => a.price.cmp(&b.price),
        StockSortField::Quantity => a.quantity.cmp(&b.quantity),
        StockSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        StockSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    // id tie-break keeps listings stable across calls
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Apply a listing filter to a zone's items
pub fn apply_filter(items: Vec<StockItem>, filter: &StockFilter, default_cap: usize) -> Vec<StockItem> {
    let term = filter
        .name
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);
    let barcode = filter.barcode.as_deref().map(str::trim).filter(|b| !b.is_empty());

    let mut matched: Vec<StockItem> = items
        .into_iter()
        .filter(|item| matches(item, term.as_deref(), barcode))
        .collect();

    matched.sort_by(|a, b| {
        let ord = compare(a, b, filter.sort);
        match filter.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let limit = match (filter.limit, term.is_some()) {
        (Some(limit), _) => Some(limit),
        (None, true) => None,
        (None, false) => Some(default_cap),
    };
    if let Some(limit) = limit {
        matched.truncate(limit);
    }
    matched
}

/// Items at or below `threshold`, lowest quantity first
pub fn low_stock(items: Vec<StockItem>, threshold: u32) -> Vec<StockItem> {
    let mut low: Vec<StockItem> = items
        .into_iter()
        .filter(|item| item.quantity <= threshold)
        .collect();
    low.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.name.cmp(&b.name)));
    low
}
