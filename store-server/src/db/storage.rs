//! redb-based storage layer for stock and orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `inventory_items` / `godown_items` | `item_id` | `StockItem` | Catalog per zone |
//! | `inventory_barcodes` / `godown_barcodes` | `barcode` | `item_id` | Unique barcode index per zone |
//! | `standard_orders` / `franchise_invoices` | `(created_at, order_id)` | `Order` | Ledger per stream (append-only) |
//! | `order_locator` | `order_id` | `(stream, created_at)` | Lookup by id |
//! | `order_numbers` | `(stream, order_number)` | `order_id` | Number uniqueness per stream |
//! | `order_counters` | `stream` | `u64` | Last issued number suffix |
//! | `processed_finalizations` | `idempotency_key` | `order_id` | Finalize retry safety |
//! | `sync_failures` | `failure_id` | `SyncFailure` | Price sync failure log |
//! | `metadata` | `key` | JSON | Provisioning flags |
//!
//! # Concurrency
//!
//! redb allows one write transaction at a time. Every stock mutation that must
//! validate and write atomically (finalize, transfer, catalog edits) runs inside
//! a single write transaction, so they are linearized. Readers get MVCC snapshots
//! and never observe a half-applied write.

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, WriteTransaction,
};
use serde::{Serialize, de::DeserializeOwned};
use shared::models::{Order, OrderStream, StockItem, SyncFailure, Zone};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Items: key = item_id, value = JSON-serialized StockItem
const INVENTORY_ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("inventory_items");
const GODOWN_ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("godown_items");

/// Barcode index: key = barcode, value = item_id
const INVENTORY_BARCODES_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("inventory_barcodes");
const GODOWN_BARCODES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("godown_barcodes");

/// Orders: key = (created_at, order_id), value = JSON-serialized Order
const STANDARD_ORDERS_TABLE: TableDefinition<(i64, &str), &[u8]> =
    TableDefinition::new("standard_orders");
const FRANCHISE_INVOICES_TABLE: TableDefinition<(i64, &str), &[u8]> =
    TableDefinition::new("franchise_invoices");

/// key = order_id, value = (stream code, created_at)
const ORDER_LOCATOR_TABLE: TableDefinition<&str, (u8, i64)> = TableDefinition::new("order_locator");

/// key = (stream, order_number), value = order_id
const ORDER_NUMBERS_TABLE: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("order_numbers");

/// key = stream, value = last issued numeric suffix
const ORDER_COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("order_counters");

/// key = idempotency key, value = order_id
const PROCESSED_FINALIZATIONS_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("processed_finalizations");

/// key = failure id, value = JSON-serialized SyncFailure
const SYNC_FAILURES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sync_failures");

/// key = name, value = JSON
const METADATA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("metadata");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Dangling order reference: {0}")]
    DanglingOrder(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

fn items_table(zone: Zone) -> TableDefinition<'static, &'static str, &'static [u8]> {
    match zone {
        Zone::Inventory => INVENTORY_ITEMS_TABLE,
        Zone::Godown => GODOWN_ITEMS_TABLE,
    }
}

fn barcodes_table(zone: Zone) -> TableDefinition<'static, &'static str, &'static str> {
    match zone {
        Zone::Inventory => INVENTORY_BARCODES_TABLE,
        Zone::Godown => GODOWN_BARCODES_TABLE,
    }
}

fn orders_table(stream: OrderStream) -> TableDefinition<'static, (i64, &'static str), &'static [u8]> {
    match stream {
        OrderStream::Standard => STANDARD_ORDERS_TABLE,
        OrderStream::Franchise => FRANCHISE_INVOICES_TABLE,
    }
}

fn stream_code(stream: OrderStream) -> u8 {
    match stream {
        OrderStream::Standard => 0,
        OrderStream::Franchise => 1,
    }
}

fn stream_from_code(code: u8) -> Option<OrderStream> {
    match code {
        0 => Some(OrderStream::Standard),
        1 => Some(OrderStream::Franchise),
        _ => None,
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn read_item(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    id: &str,
) -> StorageResult<Option<StockItem>> {
    match table.get(id)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

fn read_all_items(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> StorageResult<Vec<StockItem>> {
    let mut items = Vec::new();
    for result in table.iter()? {
        let (_key, value) = result?;
        items.push(decode(value.value())?);
    }
    Ok(items)
}

fn read_barcode(
    table: &impl ReadableTable<&'static str, &'static str>,
    barcode: &str,
) -> StorageResult<Option<String>> {
    Ok(table.get(barcode)?.map(|guard| guard.value().to_string()))
}

fn read_orders_in_range(
    table: &impl ReadableTable<(i64, &'static str), &'static [u8]>,
    from: i64,
    to: i64,
) -> StorageResult<Vec<Order>> {
    let mut orders = Vec::new();
    for result in table.range((from, "")..)? {
        let (key, value) = result?;
        if key.value().0 > to {
            break;
        }
        orders.push(decode(value.value())?);
    }
    Ok(orders)
}

/// Stock and order storage backed by redb
#[derive(Clone)]
pub struct StockStorage {
    db: Arc<Database>,
}

impl StockStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits are durable once `commit()` returns (copy-on-write with an
    /// atomic root swap), so the file is consistent after a power loss.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            for zone in Zone::ALL {
                let _ = write_txn.open_table(items_table(zone))?;
                let _ = write_txn.open_table(barcodes_table(zone))?;
            }
            let _ = write_txn.open_table(ORDER_LOCATOR_TABLE)?;
            let _ = write_txn.open_table(ORDER_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_FINALIZATIONS_TABLE)?;
            let _ = write_txn.open_table(SYNC_FAILURES_TABLE)?;
            let _ = write_txn.open_table(METADATA_TABLE)?;

            // Counters missing (fresh file, or a file written before counters
            // existed) start from the highest suffix already in the stream.
            for stream in OrderStream::ALL {
                let orders = write_txn.open_table(orders_table(stream))?;
                let mut counters = write_txn.open_table(ORDER_COUNTERS_TABLE)?;
                if counters.get(stream.as_str())?.is_none() {
                    let mut highest = 0u64;
                    for result in orders.iter()? {
                        let (_key, value) = result?;
                        let order: Order = decode(value.value())?;
                        if let Some(seq) = stream.parse_number(&order.order_number) {
                            highest = highest.max(seq);
                        }
                    }
                    counters.insert(stream.as_str(), highest)?;
                }
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction (blocks while another writer is active)
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Begin a snapshot read transaction
    pub fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    // ========== Stock Items ==========

    pub fn get_item(&self, zone: Zone, id: &str) -> StorageResult<Option<StockItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(items_table(zone))?;
        read_item(&table, id)
    }

    pub fn get_item_txn(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        id: &str,
    ) -> StorageResult<Option<StockItem>> {
        let table = txn.open_table(items_table(zone))?;
        read_item(&table, id)
    }

    pub fn get_item_by_barcode(&self, zone: Zone, barcode: &str) -> StorageResult<Option<StockItem>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(barcodes_table(zone))?;
        let Some(id) = read_barcode(&index, barcode)? else {
            return Ok(None);
        };
        let table = read_txn.open_table(items_table(zone))?;
        read_item(&table, &id)
    }

    pub fn get_item_by_barcode_txn(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        barcode: &str,
    ) -> StorageResult<Option<StockItem>> {
        let id = {
            let index = txn.open_table(barcodes_table(zone))?;
            read_barcode(&index, barcode)?
        };
        match id {
            Some(id) => self.get_item_txn(txn, zone, &id),
            None => Ok(None),
        }
    }

    /// Item id registered for a barcode in the zone
    pub fn barcode_owner_txn(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        barcode: &str,
    ) -> StorageResult<Option<String>> {
        let index = txn.open_table(barcodes_table(zone))?;
        read_barcode(&index, barcode)
    }

    /// First item whose name matches exactly (case-sensitive)
    pub fn find_item_by_name_txn(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        name: &str,
    ) -> StorageResult<Option<StockItem>> {
        let table = txn.open_table(items_table(zone))?;
        Ok(read_all_items(&table)?
            .into_iter()
            .find(|item| item.name == name))
    }

    pub fn list_items(&self, zone: Zone) -> StorageResult<Vec<StockItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(items_table(zone))?;
        read_all_items(&table)
    }

    pub fn count_items(&self, zone: Zone) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(items_table(zone))?;
        Ok(table.len()?)
    }

    /// Write an item and keep the barcode index in step with it
    ///
    /// `previous_barcode` is the barcode the stored item had before this write,
    /// if any. Uniqueness is the caller's check; this only maintains the index.
    pub fn put_item(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        item: &StockItem,
        previous_barcode: Option<&str>,
    ) -> StorageResult<()> {
        {
            let mut index = txn.open_table(barcodes_table(zone))?;
            if let Some(previous) = previous_barcode
                && previous != item.barcode
            {
                index.remove(previous)?;
            }
            index.insert(item.barcode.as_str(), item.id.as_str())?;
        }
        let mut table = txn.open_table(items_table(zone))?;
        let value = encode(item)?;
        table.insert(item.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Remove an item and its barcode entry, returning the removed item
    pub fn remove_item(
        &self,
        txn: &WriteTransaction,
        zone: Zone,
        id: &str,
    ) -> StorageResult<Option<StockItem>> {
        let removed = {
            let mut table = txn.open_table(items_table(zone))?;
            let removed = table.remove(id)?;
            match removed {
                Some(value) => Some(decode::<StockItem>(value.value())?),
                None => None,
            }
        };
        if let Some(item) = &removed {
            let mut index = txn.open_table(barcodes_table(zone))?;
            index.remove(item.barcode.as_str())?;
        }
        Ok(removed)
    }

    // ========== Orders ==========

    /// Append an order to its stream (number uniqueness is the caller's check)
    pub fn insert_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        {
            let mut table = txn.open_table(orders_table(order.stream))?;
            let value = encode(order)?;
            table.insert((order.created_at, order.id.as_str()), value.as_slice())?;
        }
        {
            let mut locator = txn.open_table(ORDER_LOCATOR_TABLE)?;
            locator.insert(order.id.as_str(), (stream_code(order.stream), order.created_at))?;
        }
        let mut numbers = txn.open_table(ORDER_NUMBERS_TABLE)?;
        numbers.insert(
            (order.stream.as_str(), order.order_number.as_str()),
            order.id.as_str(),
        )?;
        Ok(())
    }

    pub fn order_number_taken_txn(
        &self,
        txn: &WriteTransaction,
        stream: OrderStream,
        order_number: &str,
    ) -> StorageResult<bool> {
        let numbers = txn.open_table(ORDER_NUMBERS_TABLE)?;
        Ok(numbers.get((stream.as_str(), order_number))?.is_some())
    }

    pub fn order_exists_txn(&self, txn: &WriteTransaction, id: &str) -> StorageResult<bool> {
        let locator = txn.open_table(ORDER_LOCATOR_TABLE)?;
        Ok(locator.get(id)?.is_some())
    }

    pub fn get_order(&self, id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let locator = read_txn.open_table(ORDER_LOCATOR_TABLE)?;
        let Some((code, created_at)) = locator.get(id)?.map(|guard| guard.value()) else {
            return Ok(None);
        };
        let stream =
            stream_from_code(code).ok_or_else(|| StorageError::DanglingOrder(id.to_string()))?;
        let table = read_txn.open_table(orders_table(stream))?;
        match table.get((created_at, id))? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Err(StorageError::DanglingOrder(id.to_string())),
        }
    }

    pub fn get_order_txn(&self, txn: &WriteTransaction, id: &str) -> StorageResult<Option<Order>> {
        let location = {
            let locator = txn.open_table(ORDER_LOCATOR_TABLE)?;
            locator.get(id)?.map(|guard| guard.value())
        };
        let Some((code, created_at)) = location else {
            return Ok(None);
        };
        let stream =
            stream_from_code(code).ok_or_else(|| StorageError::DanglingOrder(id.to_string()))?;
        let table = txn.open_table(orders_table(stream))?;
        match table.get((created_at, id))? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Err(StorageError::DanglingOrder(id.to_string())),
        }
    }

    /// Orders of a stream with `from <= created_at <= to`, ascending by creation
    pub fn list_orders(&self, stream: OrderStream, from: i64, to: i64) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(orders_table(stream))?;
        read_orders_in_range(&table, from, to)
    }

    pub fn count_orders(&self, stream: OrderStream) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(orders_table(stream))?;
        Ok(table.len()?)
    }

    // ========== Order Counters ==========

    /// Last issued number suffix of a stream
    pub fn current_counter(&self, stream: OrderStream) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_COUNTERS_TABLE)?;
        Ok(table
            .get(stream.as_str())?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    pub fn counter_txn(&self, txn: &WriteTransaction, stream: OrderStream) -> StorageResult<u64> {
        let table = txn.open_table(ORDER_COUNTERS_TABLE)?;
        Ok(table
            .get(stream.as_str())?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    pub fn set_counter(
        &self,
        txn: &WriteTransaction,
        stream: OrderStream,
        value: u64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(ORDER_COUNTERS_TABLE)?;
        table.insert(stream.as_str(), value)?;
        Ok(())
    }

    // ========== Finalize Idempotency ==========

    pub fn processed_finalization_txn(
        &self,
        txn: &WriteTransaction,
        key: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(PROCESSED_FINALIZATIONS_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_string()))
    }

    pub fn mark_finalization_processed(
        &self,
        txn: &WriteTransaction,
        key: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_FINALIZATIONS_TABLE)?;
        table.insert(key, order_id)?;
        Ok(())
    }

    // ========== Sync Failures ==========

    /// Record a failed price-sync write in its own transaction
    pub fn record_sync_failure(&self, failure: &SyncFailure) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SYNC_FAILURES_TABLE)?;
            let value = encode(failure)?;
            table.insert(failure.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// All recorded failures, oldest first
    pub fn list_sync_failures(&self) -> StorageResult<Vec<SyncFailure>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SYNC_FAILURES_TABLE)?;
        let mut failures: Vec<SyncFailure> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            failures.push(decode(value.value())?);
        }
        failures.sort_by_key(|f| f.created_at);
        Ok(failures)
    }

    // ========== Metadata ==========

    pub fn get_metadata_txn<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(METADATA_TABLE)?;
        match table.get(key)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn set_metadata<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(METADATA_TABLE)?;
        let bytes = encode(value)?;
        table.insert(key, bytes.as_slice())?;
        Ok(())
    }

    /// Cheap round trip used by the health check
    pub fn ping(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(METADATA_TABLE)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderLineItem, PaymentMethod};

    fn item(id: &str, barcode: &str) -> StockItem {
        StockItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            price: Decimal::new(250, 2),
            quantity: 10,
            barcode: barcode.to_string(),
            created_at: 1,
            updated_at: 1,
        }
    }

    fn order(id: &str, number: &str, created_at: i64) -> Order {
        let line = OrderLineItem::priced(&item("i1", "B1"), 1).unwrap();
        Order {
            id: id.to_string(),
            order_number: number.to_string(),
            stream: OrderStream::Standard,
            total_amount: line.subtotal,
            items: vec![line],
            created_at,
            payment_method: Some(PaymentMethod::Cash),
            buyer: None,
        }
    }

    #[test]
    fn test_put_and_get_item() {
        let storage = StockStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .put_item(&txn, Zone::Inventory, &item("a", "BC-1"), None)
            .unwrap();
        txn.commit().unwrap();

        assert!(storage.get_item(Zone::Inventory, "a").unwrap().is_some());
        assert!(storage.get_item(Zone::Godown, "a").unwrap().is_none());
        let by_barcode = storage.get_item_by_barcode(Zone::Inventory, "BC-1").unwrap();
        assert_eq!(by_barcode.unwrap().id, "a");
    }

    #[test]
    fn test_barcode_index_follows_rename() {
        let storage = StockStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_item(&txn, Zone::Godown, &item("a", "OLD"), None).unwrap();
        storage
            .put_item(&txn, Zone::Godown, &item("a", "NEW"), Some("OLD"))
            .unwrap();
        txn.commit().unwrap();

        assert!(storage.get_item_by_barcode(Zone::Godown, "OLD").unwrap().is_none());
        assert!(storage.get_item_by_barcode(Zone::Godown, "NEW").unwrap().is_some());
    }

    #[test]
    fn test_remove_item_clears_barcode() {
        let storage = StockStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_item(&txn, Zone::Inventory, &item("a", "BC"), None).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let removed = storage.remove_item(&txn, Zone::Inventory, "a").unwrap();
        assert!(removed.is_some());
        assert!(storage.remove_item(&txn, Zone::Inventory, "a").unwrap().is_none());
        txn.commit().unwrap();

        assert!(storage.get_item_by_barcode(Zone::Inventory, "BC").unwrap().is_none());
    }

    #[test]
    fn test_uncommitted_write_is_invisible() {
        let storage = StockStorage::open_in_memory().unwrap();
        {
            let txn = storage.begin_write().unwrap();
            storage.put_item(&txn, Zone::Inventory, &item("a", "BC"), None).unwrap();
            // dropped without commit
        }
        assert!(storage.get_item(Zone::Inventory, "a").unwrap().is_none());
    }

    #[test]
    fn test_orders_range_and_locator() {
        let storage = StockStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.insert_order(&txn, &order("o1", "ORD-0001", 100)).unwrap();
        storage.insert_order(&txn, &order("o2", "ORD-0002", 200)).unwrap();
        storage.insert_order(&txn, &order("o3", "ORD-0003", 300)).unwrap();
        assert!(storage
            .order_number_taken_txn(&txn, OrderStream::Standard, "ORD-0002")
            .unwrap());
        assert!(!storage
            .order_number_taken_txn(&txn, OrderStream::Franchise, "ORD-0002")
            .unwrap());
        txn.commit().unwrap();

        let ids: Vec<String> = storage
            .list_orders(OrderStream::Standard, 150, 300)
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["o2", "o3"]);
        assert_eq!(storage.get_order("o1").unwrap().unwrap().order_number, "ORD-0001");
        assert!(storage.get_order("missing").unwrap().is_none());
    }

    #[test]
    fn test_counters_initialized_from_existing_orders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");
        {
            let storage = StockStorage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            storage.insert_order(&txn, &order("o1", "ORD-0007", 100)).unwrap();
            txn.commit().unwrap();

            // Simulate a file written before counters existed
            let txn = storage.begin_write().unwrap();
            {
                let mut counters = txn.open_table(ORDER_COUNTERS_TABLE).unwrap();
                counters.remove(OrderStream::Standard.as_str()).unwrap();
            }
            txn.commit().unwrap();
        }

        let storage = StockStorage::open(&path).unwrap();
        assert_eq!(storage.current_counter(OrderStream::Standard).unwrap(), 7);
        assert_eq!(storage.current_counter(OrderStream::Franchise).unwrap(), 0);
    }

    #[test]
    fn test_sync_failures_roundtrip() {
        let storage = StockStorage::open_in_memory().unwrap();
        let failure = SyncFailure {
            id: "f1".into(),
            zone: Zone::Godown,
            item_id: Some("g1".into()),
            source_item_id: "i1".into(),
            barcode: "B1".into(),
            price: Decimal::new(350, 2),
            error: "boom".into(),
            created_at: 5,
        };
        storage.record_sync_failure(&failure).unwrap();
        assert_eq!(storage.list_sync_failures().unwrap(), vec![failure]);
    }
}
