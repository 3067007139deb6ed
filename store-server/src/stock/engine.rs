//! Stock Movement Engine
//!
//! The only writer of stock quantities outside plain catalog edits.
//!
//! # Checkout
//!
//! ```text
//! finalize_order(request)
//!     ├─ validate request (lines, payment, buyer)      no transaction yet
//!     ├─ begin_write ───────────────────────────────── exclusive writer
//!     │    ├─ idempotency key seen? → stored order
//!     │    ├─ re-read every item, check quantities
//!     │    ├─ decrement, number, append, mark key
//!     │    └─ commit
//!     └─ any error before commit drops the transaction
//! ```
//!
//! Transfers follow the same shape. Price sync runs after the primary commit,
//! see [`super::sync`].

use super::draft::{self, DraftOrder};
use super::sync::{EditOrigin, PriceSyncer, SyncDispatch, SyncRequest};
use super::{StockError, StockResult};
use crate::catalog::CatalogStore;
use crate::db::{StockStorage, StorageError};
use crate::ledger::OrderLedger;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    BuyerInfo, DraftLine, FinalizeRequest, Order, OrderFilter, OrderPreview, OrderStream,
    StockFilter, StockItem, StockItemCreate, StockItemUpdate, StreamSelector, SyncFailure,
    TransferRequest, TransferResult, Zone,
};
use shared::util::{new_id, now_millis};

#[derive(Clone)]
pub struct StockEngine {
    storage: StockStorage,
    catalog: CatalogStore,
    ledger: OrderLedger,
    sync: SyncDispatch,
}

impl StockEngine {
    /// Engine applying price sync inline
    pub fn new(storage: StockStorage, tz: Tz, list_cap: usize) -> Self {
        Self {
            catalog: CatalogStore::new(storage.clone(), list_cap),
            ledger: OrderLedger::new(storage.clone(), tz),
            sync: SyncDispatch::Inline(PriceSyncer::new(storage.clone())),
            storage,
        }
    }

    /// Route price sync through a queue (see [`super::PriceSyncWorker::channel`])
    pub fn with_sync_dispatch(mut self, dispatch: SyncDispatch) -> Self {
        self.sync = dispatch;
        self
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    // ========== Catalog ==========

    pub fn get_stock(&self, zone: Zone, id: &str) -> StockResult<StockItem> {
        self.catalog
            .get(zone, id)?
            .ok_or_else(|| StockError::not_found(zone, id))
    }

    pub fn get_stock_by_barcode(&self, zone: Zone, barcode: &str) -> StockResult<Option<StockItem>> {
        self.catalog.get_by_barcode(zone, barcode)
    }

    pub fn list_stock(&self, zone: Zone, filter: &StockFilter) -> StockResult<Vec<StockItem>> {
        self.catalog.list(zone, filter)
    }

    pub fn list_low_stock(&self, zone: Zone, threshold: u32) -> StockResult<Vec<StockItem>> {
        self.catalog.list_low_stock(zone, threshold)
    }

    /// Add an item; its price is pushed to the counterpart in the other zone
    pub fn add_stock(&self, zone: Zone, create: StockItemCreate) -> StockResult<StockItem> {
        let item = self.catalog.add(zone, create)?;
        tracing::info!(zone = %zone, item_id = %item.id, barcode = %item.barcode, "Stock item added");

        self.sync.dispatch(SyncRequest {
            source_zone: zone,
            source: item.clone(),
            match_by_name: true,
        });
        Ok(item)
    }

    pub fn edit_stock(&self, zone: Zone, id: &str, patch: StockItemUpdate) -> StockResult<StockItem> {
        self.edit_stock_as(zone, id, patch, EditOrigin::Direct)
    }

    /// Edit with an explicit origin; only direct price edits schedule a sync
    pub fn edit_stock_as(
        &self,
        zone: Zone,
        id: &str,
        patch: StockItemUpdate,
        origin: EditOrigin,
    ) -> StockResult<StockItem> {
        let price_set = patch.price.is_some();

        let txn = self.storage.begin_write()?;
        let (before, after) = self.catalog.update_txn(&txn, zone, id, patch, now_millis())?;
        txn.commit()?;

        if before.price != after.price {
            tracing::info!(
                zone = %zone,
                item_id = %after.id,
                old_price = %before.price,
                new_price = %after.price,
                "Price changed"
            );
        }

        if price_set && origin == EditOrigin::Direct {
            self.sync.dispatch(SyncRequest {
                source_zone: zone,
                source: after.clone(),
                match_by_name: false,
            });
        }
        Ok(after)
    }

    pub fn remove_stock(&self, zone: Zone, id: &str) -> StockResult<StockItem> {
        let removed = self.catalog.remove(zone, id)?;
        tracing::info!(zone = %zone, item_id = %removed.id, "Stock item removed");
        Ok(removed)
    }

    pub fn list_sync_failures(&self) -> StockResult<Vec<SyncFailure>> {
        Ok(self.storage.list_sync_failures()?)
    }

    // ========== Orders ==========

    pub fn next_order_number(&self, stream: OrderStream) -> StockResult<String> {
        self.ledger.next_order_number(stream)
    }

    pub fn query_orders(&self, selector: StreamSelector, filter: &OrderFilter) -> StockResult<Vec<Order>> {
        self.ledger.query(selector, filter)
    }

    pub fn get_order(&self, id: &str) -> StockResult<Option<Order>> {
        self.ledger.get(id)
    }

    /// Price a draft against current stock without writing anything
    pub fn preview_order(&self, stream: OrderStream, lines: &[DraftLine]) -> StockResult<OrderPreview> {
        let zone = stream.zone();
        let mut draft = DraftOrder::new(stream);
        for line in draft::merge_lines(lines)? {
            let item = self.get_stock(zone, &line.stock_item_id)?;
            draft.add(&item, line.quantity)?;
        }
        let (items, total_amount) = draft.priced()?;
        Ok(OrderPreview {
            stream,
            order_number: self.ledger.next_order_number(stream)?,
            items,
            total_amount,
        })
    }

    /// Check out a draft: validate, decrement stock and append the order atomically
    pub fn finalize_order(&self, request: FinalizeRequest) -> StockResult<Order> {
        let stream = request.stream;
        if request.lines.is_empty() {
            return Err(StockError::EmptyOrder);
        }
        let payment_method = request
            .payment_method
            .ok_or(StockError::MissingPaymentMethod)?;
        let buyer = match stream {
            OrderStream::Standard => None,
            OrderStream::Franchise => {
                let buyer = request.buyer.unwrap_or_default();
                let missing = buyer.missing_fields();
                if !missing.is_empty() {
                    return Err(StockError::MissingBuyerInfo { missing });
                }
                Some(BuyerInfo {
                    buyer_name: buyer.buyer_name.trim().to_string(),
                    buyer_phone: buyer.buyer_phone.trim().to_string(),
                    city: buyer.city.trim().to_string(),
                })
            }
        };
        let lines = draft::merge_lines(&request.lines)?;
        let idempotency_key = request
            .idempotency_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());

        let txn = self.storage.begin_write()?;

        if let Some(key) = idempotency_key
            && let Some(order_id) = self.storage.processed_finalization_txn(&txn, key)?
        {
            let order = self
                .storage
                .get_order_txn(&txn, &order_id)?
                .ok_or(StorageError::DanglingOrder(order_id))?;
            tracing::info!(
                order_number = %order.order_number,
                idempotency_key = %key,
                "Finalize replayed, returning stored order"
            );
            return Ok(order);
        }

        let zone = stream.zone();
        let mut picked = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = self
                .storage
                .get_item_txn(&txn, zone, &line.stock_item_id)?
                .ok_or_else(|| StockError::ProductVanished {
                    id: line.stock_item_id.clone(),
                })?;
            if item.quantity < line.quantity {
                return Err(StockError::InsufficientStock {
                    name: item.name,
                    available: item.quantity,
                    requested: line.quantity,
                });
            }
            picked.push((item, line.quantity));
        }

        let now = now_millis();
        let (items, total_amount) = draft::price_lines(&picked)?;
        for (mut item, quantity) in picked {
            item.quantity -= quantity;
            item.updated_at = now;
            self.storage.put_item(&txn, zone, &item, None)?;
        }

        let order = Order {
            id: String::new(),
            order_number: String::new(),
            stream,
            total_amount,
            items,
            created_at: now,
            payment_method: Some(payment_method),
            buyer,
        };
        let order = self.ledger.append_txn(&txn, order, now)?;
        if let Some(key) = idempotency_key {
            self.storage.mark_finalization_processed(&txn, key, &order.id)?;
        }
        txn.commit()?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            stream = %stream,
            total = %order.total_amount,
            lines = order.items.len(),
            "Order finalized"
        );
        Ok(order)
    }

    // ========== Transfer ==========

    /// Move stock from the godown to the inventory
    ///
    /// The godown price is authoritative: a matching inventory item (same
    /// barcode) takes it over, a new one is created with it.
    pub fn transfer_stock(&self, request: TransferRequest) -> StockResult<TransferResult> {
        let moved = request.quantity;
        if moved == 0 {
            return Err(StockError::validation("transfer quantity must be greater than zero"));
        }

        let txn = self.storage.begin_write()?;
        let mut godown_item = self
            .storage
            .get_item_txn(&txn, Zone::Godown, &request.godown_item_id)?
            .ok_or_else(|| StockError::not_found(Zone::Godown, &request.godown_item_id))?;
        if godown_item.quantity < moved {
            return Err(StockError::InsufficientStock {
                name: godown_item.name,
                available: godown_item.quantity,
                requested: moved,
            });
        }
        if godown_item.price <= Decimal::ZERO {
            return Err(StockError::InvalidPrice {
                name: godown_item.name,
                price: godown_item.price,
            });
        }

        let now = now_millis();
        let existing =
            self.storage
                .get_item_by_barcode_txn(&txn, Zone::Inventory, &godown_item.barcode)?;
        let created = existing.is_none();
        let inventory_item = match existing {
            Some(mut item) => {
                item.quantity = item.quantity.checked_add(moved).ok_or_else(|| {
                    StockError::validation(format!("quantity of {} would overflow", item.name))
                })?;
                item.price = godown_item.price;
                item.updated_at = now;
                item
            }
            None => StockItem {
                id: new_id(),
                name: godown_item.name.clone(),
                price: godown_item.price,
                quantity: moved,
                barcode: godown_item.barcode.clone(),
                created_at: now,
                updated_at: now,
            },
        };
        self.storage.put_item(&txn, Zone::Inventory, &inventory_item, None)?;

        godown_item.quantity -= moved;
        godown_item.updated_at = now;
        self.storage.put_item(&txn, Zone::Godown, &godown_item, None)?;
        txn.commit()?;

        tracing::info!(
            godown_item_id = %godown_item.id,
            inventory_item_id = %inventory_item.id,
            moved,
            created,
            "Stock transferred to inventory"
        );
        Ok(TransferResult {
            godown_item,
            inventory_item,
            created,
            moved,
        })
    }
}
