//! Order Model (standard sales orders and franchise invoices)

use super::stock::{SortDirection, StockItem, Zone};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order stream. Each stream has its own numbering sequence and draws stock
/// from its own zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStream {
    /// Storefront sale, `ORD-nnnn`, inventory stock
    Standard,
    /// Franchise invoice, `FINV-nnnn`, godown stock
    Franchise,
}

impl OrderStream {
    pub const ALL: [OrderStream; 2] = [OrderStream::Standard, OrderStream::Franchise];

    pub fn prefix(self) -> &'static str {
        match self {
            OrderStream::Standard => "ORD-",
            OrderStream::Franchise => "FINV-",
        }
    }

    /// Zone whose quantities are consumed when an order of this stream is finalized
    pub fn zone(self) -> Zone {
        match self {
            OrderStream::Standard => Zone::Inventory,
            OrderStream::Franchise => Zone::Godown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStream::Standard => "standard",
            OrderStream::Franchise => "franchise",
        }
    }

    /// Render a zero-padded order number (`ORD-0007`)
    pub fn format_number(self, seq: u64) -> String {
        format!("{}{:04}", self.prefix(), seq)
    }

    /// Numeric suffix of an order number of this stream, if it has one
    pub fn parse_number(self, order_number: &str) -> Option<u64> {
        order_number
            .strip_prefix(self.prefix())
            .and_then(|suffix| suffix.parse::<u64>().ok())
    }
}

impl fmt::Display for OrderStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(OrderStream::Standard),
            "franchise" => Ok(OrderStream::Franchise),
            other => Err(format!("unknown order stream: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Online,
}

/// Priced snapshot of one order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub stock_item_id: String,
    pub name: String,
    pub price_at_sale: Decimal,
    pub quantity: u32,
    /// price_at_sale × quantity
    pub subtotal: Decimal,
    /// Quantity on hand when the line was priced
    pub stock_before_sale: u32,
}

impl OrderLineItem {
    /// `None` when price × quantity does not fit in a `Decimal`
    pub fn priced(item: &StockItem, quantity: u32) -> Option<Self> {
        Some(Self {
            stock_item_id: item.id.clone(),
            name: item.name.clone(),
            price_at_sale: item.price,
            quantity,
            subtotal: item.price.checked_mul(Decimal::from(quantity))?,
            stock_before_sale: item.quantity,
        })
    }
}

/// Sum of the line subtotals, `None` on overflow
pub fn sum_subtotals(items: &[OrderLineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.subtotal))
}

/// Franchise buyer details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    pub buyer_name: String,
    pub buyer_phone: String,
    pub city: String,
}

impl BuyerInfo {
    /// Names of the fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.buyer_name.trim().is_empty() {
            missing.push("buyer_name");
        }
        if self.buyer_phone.trim().is_empty() {
            missing.push("buyer_phone");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        missing
    }
}

/// Finalized order (immutable once appended to the ledger)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub stream: OrderStream,
    pub items: Vec<OrderLineItem>,
    pub total_amount: Decimal,
    /// Unix millis
    pub created_at: i64,
    /// Imported history may lack it
    pub payment_method: Option<PaymentMethod>,
    /// Franchise invoices only
    pub buyer: Option<BuyerInfo>,
}

impl Order {
    /// Sum of the line subtotals, `None` on overflow
    pub fn computed_total(&self) -> Option<Decimal> {
        sum_subtotals(&self.items)
    }

    /// Every subtotal equals price × quantity and the total equals their sum
    pub fn totals_reconcile(&self) -> bool {
        self.items.iter().all(|line| {
            line.price_at_sale.checked_mul(Decimal::from(line.quantity)) == Some(line.subtotal)
        }) && self.computed_total() == Some(self.total_amount)
    }
}

/// One requested line of a draft: which item, how many
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    pub stock_item_id: String,
    pub quantity: u32,
}

/// Finalize (checkout) request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub stream: OrderStream,
    pub lines: Vec<DraftLine>,
    pub payment_method: Option<PaymentMethod>,
    pub buyer: Option<BuyerInfo>,
    /// Retrying with the same key returns the already persisted order
    pub idempotency_key: Option<String>,
}

/// Priced draft, nothing persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPreview {
    pub stream: OrderStream,
    /// Number the next finalized order of the stream would get
    pub order_number: String,
    pub items: Vec<OrderLineItem>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamSelector {
    #[default]
    All,
    Standard,
    Franchise,
}

impl StreamSelector {
    pub fn streams(self) -> &'static [OrderStream] {
        match self {
            StreamSelector::All => &OrderStream::ALL,
            StreamSelector::Standard => &[OrderStream::Standard],
            StreamSelector::Franchise => &[OrderStream::Franchise],
        }
    }
}

impl From<OrderStream> for StreamSelector {
    fn from(stream: OrderStream) -> Self {
        match stream {
            OrderStream::Standard => StreamSelector::Standard,
            OrderStream::Franchise => StreamSelector::Franchise,
        }
    }
}

/// Order ledger query filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Inclusive, from the start of the day in the business timezone
    pub start_date: Option<NaiveDate>,
    /// Inclusive, up to 23:59:59.999 in the business timezone
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring
    pub order_number: Option<String>,
    /// Case-insensitive substring
    pub buyer_name: Option<String>,
    /// Substring
    pub buyer_phone: Option<String>,
    /// Exact match
    pub city: Option<String>,
    /// By created_at, newest first when absent
    pub direction: Option<SortDirection>,
    pub limit: Option<usize>,
}
