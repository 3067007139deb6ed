//! Catalog Store
//!
//! Per-zone CRUD over stock items. Every write validates and applies inside
//! one redb write transaction; the `*_txn` variants let the stock engine
//! compose catalog writes with ledger writes in the same transaction.
//!
//! Price synchronisation is not triggered here; see [`crate::stock::StockEngine`].

pub mod filter;

use crate::db::StockStorage;
use crate::stock::{StockError, StockResult};
use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::models::{StockFilter, StockItem, StockItemCreate, StockItemUpdate, Zone};
use shared::util::{new_id, now_millis};

pub use filter::DEFAULT_LIST_CAP;

fn require_text(field: &str, value: &str) -> StockResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StockError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn require_price(name: &str, price: Decimal) -> StockResult<()> {
    if price <= Decimal::ZERO {
        return Err(StockError::InvalidPrice {
            name: name.to_string(),
            price,
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct CatalogStore {
    storage: StockStorage,
    list_cap: usize,
}

impl CatalogStore {
    pub fn new(storage: StockStorage, list_cap: usize) -> Self {
        Self { storage, list_cap }
    }

    pub fn storage(&self) -> &StockStorage {
        &self.storage
    }

    // ========== Reads ==========

    pub fn get(&self, zone: Zone, id: &str) -> StockResult<Option<StockItem>> {
        Ok(self.storage.get_item(zone, id)?)
    }

    pub fn get_by_barcode(&self, zone: Zone, barcode: &str) -> StockResult<Option<StockItem>> {
        Ok(self.storage.get_item_by_barcode(zone, barcode.trim())?)
    }

    pub fn list(&self, zone: Zone, filter: &StockFilter) -> StockResult<Vec<StockItem>> {
        let items = self.storage.list_items(zone)?;
        Ok(filter::apply_filter(items, filter, self.list_cap))
    }

    pub fn list_low_stock(&self, zone: Zone, threshold: u32) -> StockResult<Vec<StockItem>> {
        let items = self.storage.list_items(zone)?;
        Ok(filter::low_stock(items, threshold))
    }

    // ========== Writes ==========

    pub fn add(&self, zone: Zone, create: StockItemCreate) -> StockResult<StockItem> {
        let txn = self.storage.begin_write()?;
        let item = self.add_txn(&txn, zone, create, now_millis())?;
        txn.commit()?;
        Ok(item)
    }

    pub fn add_txn(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        create: StockItemCreate,
        now: i64,
    ) -> StockResult<StockItem> {
        let name = require_text("name", &create.name)?;
        let barcode = require_text("barcode", &create.barcode)?;
        require_price(&name, create.price)?;

        if self.storage.barcode_owner_txn(txn, zone, &barcode)?.is_some() {
            return Err(StockError::DuplicateBarcode { zone, barcode });
        }

        let item = StockItem {
            id: new_id(),
            name,
            price: create.price,
            quantity: create.quantity,
            barcode,
            created_at: now,
            updated_at: now,
        };
        self.storage.put_item(txn, zone, &item, None)?;
        Ok(item)
    }

    pub fn update(&self, zone: Zone, id: &str, patch: StockItemUpdate) -> StockResult<StockItem> {
        let txn = self.storage.begin_write()?;
        let (_, item) = self.update_txn(&txn, zone, id, patch, now_millis())?;
        txn.commit()?;
        Ok(item)
    }

    /// Apply a partial update, returning the item before and after
    pub fn update_txn(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        id: &str,
        patch: StockItemUpdate,
        now: i64,
    ) -> StockResult<(StockItem, StockItem)> {
        let before = self
            .storage
            .get_item_txn(txn, zone, id)?
            .ok_or_else(|| StockError::not_found(zone, id))?;
        let mut after = before.clone();

        if let Some(name) = patch.name {
            after.name = require_text("name", &name)?;
        }
        if let Some(price) = patch.price {
            require_price(&after.name, price)?;
            after.price = price;
        }
        if let Some(quantity) = patch.quantity {
            after.quantity = quantity;
        }
        if let Some(barcode) = patch.barcode {
            let barcode = require_text("barcode", &barcode)?;
            if barcode != before.barcode
                && let Some(owner) = self.storage.barcode_owner_txn(txn, zone, &barcode)?
                && owner != before.id
            {
                return Err(StockError::DuplicateBarcode { zone, barcode });
            }
            after.barcode = barcode;
        }

        after.updated_at = now;
        self.storage
            .put_item(txn, zone, &after, Some(before.barcode.as_str()))?;
        Ok((before, after))
    }

    pub fn remove(&self, zone: Zone, id: &str) -> StockResult<StockItem> {
        let txn = self.storage.begin_write()?;
        let removed = self
            .storage
            .remove_item(&txn, zone, id)?
            .ok_or_else(|| StockError::not_found(zone, id))?;
        txn.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogStore {
        CatalogStore::new(StockStorage::open_in_memory().unwrap(), DEFAULT_LIST_CAP)
    }

    fn apple() -> StockItemCreate {
        StockItemCreate {
            name: "Apple".into(),
            price: Decimal::new(300, 2),
            quantity: 10,
            barcode: "B1".into(),
        }
    }

    #[test]
    fn test_add_and_lookup() {
        let catalog = catalog();
        let item = catalog.add(Zone::Inventory, apple()).unwrap();
        assert!(!item.id.is_empty());
        assert_eq!(item.created_at, item.updated_at);

        assert_eq!(catalog.get(Zone::Inventory, &item.id).unwrap(), Some(item.clone()));
        assert_eq!(catalog.get_by_barcode(Zone::Inventory, "B1").unwrap(), Some(item));
        assert!(catalog.get_by_barcode(Zone::Godown, "B1").unwrap().is_none());
    }

    #[test]
    fn test_add_rejects_duplicate_barcode_in_same_zone_only() {
        let catalog = catalog();
        catalog.add(Zone::Inventory, apple()).unwrap();
        let err = catalog.add(Zone::Inventory, apple()).unwrap_err();
        assert!(matches!(err, StockError::DuplicateBarcode { .. }));

        catalog.add(Zone::Godown, apple()).unwrap();
    }

    #[test]
    fn test_add_validates_fields() {
        let catalog = catalog();
        let mut create = apple();
        create.price = Decimal::ZERO;
        assert!(matches!(
            catalog.add(Zone::Inventory, create).unwrap_err(),
            StockError::InvalidPrice { .. }
        ));

        let mut create = apple();
        create.barcode = "  ".into();
        assert!(matches!(
            catalog.add(Zone::Inventory, create).unwrap_err(),
            StockError::Validation(_)
        ));
    }

    #[test]
    fn test_update_partial_fields() {
        let catalog = catalog();
        let item = catalog.add(Zone::Inventory, apple()).unwrap();
        let updated = catalog
            .update(Zone::Inventory, &item.id, StockItemUpdate::quantity(4))
            .unwrap();
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.price, item.price);
        assert_eq!(updated.name, "Apple");
    }

    #[test]
    fn test_update_barcode_collision() {
        let catalog = catalog();
        let first = catalog.add(Zone::Inventory, apple()).unwrap();
        let mut other = apple();
        other.barcode = "B2".into();
        let second = catalog.add(Zone::Inventory, other).unwrap();

        let patch = StockItemUpdate {
            barcode: Some("B1".into()),
            ..Default::default()
        };
        let err = catalog.update(Zone::Inventory, &second.id, patch).unwrap_err();
        assert!(matches!(err, StockError::DuplicateBarcode { .. }));

        // Re-submitting the item's own barcode is not a collision
        let patch = StockItemUpdate {
            barcode: Some("B1".into()),
            ..Default::default()
        };
        catalog.update(Zone::Inventory, &first.id, patch).unwrap();
    }

    #[test]
    fn test_update_and_remove_missing_item() {
        let catalog = catalog();
        let err = catalog
            .update(Zone::Godown, "nope", StockItemUpdate::quantity(1))
            .unwrap_err();
        assert!(matches!(err, StockError::NotFound { .. }));
        assert!(matches!(
            catalog.remove(Zone::Godown, "nope").unwrap_err(),
            StockError::NotFound { .. }
        ));
    }

    #[test]
    fn test_remove_frees_barcode() {
        let catalog = catalog();
        let item = catalog.add(Zone::Inventory, apple()).unwrap();
        catalog.remove(Zone::Inventory, &item.id).unwrap();
        assert!(catalog.get(Zone::Inventory, &item.id).unwrap().is_none());
        catalog.add(Zone::Inventory, apple()).unwrap();
    }

    #[test]
    fn test_low_stock_listing() {
        let catalog = catalog();
        catalog.add(Zone::Inventory, apple()).unwrap();
        let mut milk = apple();
        milk.name = "Almond Milk".into();
        milk.barcode = "M1".into();
        milk.quantity = 5;
        catalog.add(Zone::Inventory, milk).unwrap();

        let low = catalog.list_low_stock(Zone::Inventory, 9).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Almond Milk");
    }
}
