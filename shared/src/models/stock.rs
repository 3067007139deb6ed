//! Stock Model (商品库存: storefront inventory + godown warehouse)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stock zone. Both zones hold the same item shape; the zone only decides
/// which collection an item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Storefront stock, sold through standard orders
    Inventory,
    /// Warehouse stock, sold through franchise invoices and transferred to inventory
    Godown,
}

impl Zone {
    pub const ALL: [Zone; 2] = [Zone::Inventory, Zone::Godown];

    /// The counterpart zone used by price synchronisation
    pub fn other(self) -> Zone {
        match self {
            Zone::Inventory => Zone::Godown,
            Zone::Godown => Zone::Inventory,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Inventory => "inventory",
            Zone::Godown => "godown",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inventory" => Ok(Zone::Inventory),
            "godown" => Ok(Zone::Godown),
            other => Err(format!("unknown zone: {other}")),
        }
    }
}

/// Stock item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: String,
    pub name: String,
    /// Unit price, always > 0
    pub price: Decimal,
    pub quantity: u32,
    /// Unique within the zone
    pub barcode: String,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

/// Create stock item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItemCreate {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    pub barcode: String,
}

/// Update stock item payload (absent fields are left untouched)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockItemUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
    pub barcode: Option<String>,
}

impl StockItemUpdate {
    pub fn price(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }

    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSortField {
    #[default]
    Name,
    Price,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Catalog listing filter
///
/// With no `limit` and no `name` term the listing is capped by the store's
/// default cap; a name term without limit returns every match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockFilter {
    /// Case-insensitive substring of the item name
    pub name: Option<String>,
    /// Exact barcode
    pub barcode: Option<String>,
    #[serde(default)]
    pub sort: StockSortField,
    #[serde(default)]
    pub direction: SortDirection,
    pub limit: Option<usize>,
}

/// Godown → inventory transfer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub godown_item_id: String,
    pub quantity: u32,
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub godown_item: StockItem,
    pub inventory_item: StockItem,
    /// True when the inventory item did not exist and was created by the transfer
    pub created: bool,
    pub moved: u32,
}

/// A price-sync write that could not be applied to the counterpart zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub id: String,
    /// Zone whose item should have been updated
    pub zone: Zone,
    /// Counterpart in `zone`, when it was found before the failure
    pub item_id: Option<String>,
    /// Item whose price was set, in the other zone
    pub source_item_id: String,
    pub barcode: String,
    pub price: Decimal,
    pub error: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_other() {
        assert_eq!(Zone::Inventory.other(), Zone::Godown);
        assert_eq!(Zone::Godown.other(), Zone::Inventory);
    }

    #[test]
    fn test_zone_parse() {
        assert_eq!("Godown".parse::<Zone>(), Ok(Zone::Godown));
        assert!("shelf".parse::<Zone>().is_err());
        assert_eq!(serde_json::to_string(&Zone::Inventory).unwrap(), "\"inventory\"");
    }

    #[test]
    fn test_filter_defaults() {
        let filter: StockFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.sort, StockSortField::Name);
        assert_eq!(filter.direction, SortDirection::Asc);
        assert!(filter.limit.is_none());
    }

    #[test]
    fn test_price_serializes_as_string() {
        let item = StockItemCreate {
            name: "Apple".into(),
            price: Decimal::new(350, 2),
            quantity: 4,
            barcode: "A1".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["price"], "3.50");
    }
}
