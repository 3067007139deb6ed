//! Cross-zone price synchronisation
//!
//! When an item's price is set directly (add, or an edit carrying a price),
//! the counterpart item in the other zone is brought to the same price.
//! This is best effort: the secondary write runs in its own transaction after
//! the primary one committed, and its failure is logged and recorded in the
//! `sync_failures` table, never returned to the caller.
//!
//! Counterpart lookup: same barcode in the other zone; for add flows only,
//! an exact name match when no barcode matches.
//!
//! # Delivery
//!
//! ```text
//! StockEngine ──SyncRequest──▶ mpsc ──▶ PriceSyncWorker ──▶ PriceSyncer::apply
//!      └─────────── (no worker attached) ───────────────────▶ PriceSyncer::apply
//! ```

use crate::db::StockStorage;
use crate::stock::{StockError, StockResult};
use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::models::{StockItem, SyncFailure, Zone};
use shared::util::{new_id, now_millis};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Who is writing a price. Writes made by the syncer are `Sync` and never
/// schedule another sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    Direct,
    Sync,
}

/// What the counterpart needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    None,
    UpdatePrice {
        zone: Zone,
        item_id: String,
        price: Decimal,
    },
}

/// Decide how the counterpart (living in `counterpart_zone`) must change
pub fn reconcile(source: &StockItem, counterpart_zone: Zone, counterpart: Option<&StockItem>) -> SyncAction {
    match counterpart {
        Some(other) if other.price != source.price => SyncAction::UpdatePrice {
            zone: counterpart_zone,
            item_id: other.id.clone(),
            price: source.price,
        },
        _ => SyncAction::None,
    }
}

/// A queued price-sync job
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Zone of the item whose price was set
    pub source_zone: Zone,
    pub source: StockItem,
    /// Fall back to an exact name match (add flows)
    pub match_by_name: bool,
}

/// Applies sync requests against storage
#[derive(Clone)]
pub struct PriceSyncer {
    storage: StockStorage,
}

impl PriceSyncer {
    pub fn new(storage: StockStorage) -> Self {
        Self { storage }
    }

    /// Apply one request; failures are logged and recorded, never returned
    pub fn apply(&self, request: &SyncRequest) -> SyncAction {
        match self.try_apply(request) {
            Ok(action) => action,
            Err((counterpart_id, e)) => {
                let target = request.source_zone.other();
                tracing::warn!(
                    zone = %target,
                    barcode = %request.source.barcode,
                    counterpart_id = counterpart_id.as_deref().unwrap_or("-"),
                    error = %e,
                    "Price sync failed"
                );
                let failure = SyncFailure {
                    id: new_id(),
                    zone: target,
                    item_id: counterpart_id,
                    source_item_id: request.source.id.clone(),
                    barcode: request.source.barcode.clone(),
                    price: request.source.price,
                    error: e.to_string(),
                    created_at: now_millis(),
                };
                if let Err(record_err) = self.storage.record_sync_failure(&failure) {
                    tracing::error!(error = %record_err, "Failed to record price sync failure");
                }
                SyncAction::None
            }
        }
    }

    /// Errors carry the counterpart id once the counterpart is known
    fn try_apply(&self, request: &SyncRequest) -> Result<SyncAction, (Option<String>, StockError)> {
        let target = request.source_zone.other();
        let txn = self
            .storage
            .begin_write()
            .map_err(|e| (None, StockError::from(e)))?;
        let counterpart = self
            .find_counterpart(&txn, target, request)
            .map_err(|e| (None, e))?;

        let action = reconcile(&request.source, target, counterpart.as_ref());
        if let (SyncAction::UpdatePrice { price, .. }, Some(item)) = (&action, counterpart) {
            let item_id = item.id.clone();
            self.write_price(txn, target, item, *price)
                .map_err(|e| (Some(item_id), e))?;
        }
        Ok(action)
    }

    fn find_counterpart(
        &self,
        txn: &WriteTransaction,
        target: Zone,
        request: &SyncRequest,
    ) -> StockResult<Option<StockItem>> {
        let by_barcode = self
            .storage
            .get_item_by_barcode_txn(txn, target, &request.source.barcode)?;
        if by_barcode.is_some() || !request.match_by_name {
            return Ok(by_barcode);
        }
        Ok(self
            .storage
            .find_item_by_name_txn(txn, target, &request.source.name)?)
    }

    fn write_price(
        &self,
        txn: WriteTransaction,
        zone: Zone,
        mut item: StockItem,
        price: Decimal,
    ) -> StockResult<()> {
        if price <= Decimal::ZERO {
            return Err(StockError::InvalidPrice {
                name: item.name,
                price,
            });
        }
        item.price = price;
        item.updated_at = now_millis();
        self.storage.put_item(&txn, zone, &item, Some(item.barcode.as_str()))?;
        txn.commit()?;
        tracing::info!(
            zone = %zone,
            item_id = %item.id,
            price = %item.price,
            "Price synced from {}",
            zone.other()
        );
        Ok(())
    }
}

/// How the engine hands sync requests off
#[derive(Clone)]
pub enum SyncDispatch {
    /// Apply right after the primary commit, on the caller's thread
    Inline(PriceSyncer),
    /// Queue for the background worker
    Queued {
        tx: mpsc::Sender<SyncRequest>,
        fallback: PriceSyncer,
    },
}

impl SyncDispatch {
    pub fn dispatch(&self, request: SyncRequest) {
        match self {
            SyncDispatch::Inline(syncer) => {
                syncer.apply(&request);
            }
            SyncDispatch::Queued { tx, fallback } => {
                if let Err(e) = tx.try_send(request) {
                    // Queue full or worker gone: do it now rather than drop it
                    tracing::warn!("Price sync queue unavailable, applying inline");
                    let request = match e {
                        mpsc::error::TrySendError::Full(r) | mpsc::error::TrySendError::Closed(r) => r,
                    };
                    fallback.apply(&request);
                }
            }
        }
    }
}

/// Background consumer of queued price-sync requests
pub struct PriceSyncWorker {
    syncer: PriceSyncer,
    rx: mpsc::Receiver<SyncRequest>,
}

impl PriceSyncWorker {
    /// Build a worker and the dispatch the engine should use to feed it
    pub fn channel(storage: StockStorage, capacity: usize) -> (Self, SyncDispatch) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let syncer = PriceSyncer::new(storage);
        let dispatch = SyncDispatch::Queued {
            tx,
            fallback: syncer.clone(),
        };
        (Self { syncer, rx }, dispatch)
    }

    /// Run until every sender is dropped or shutdown is requested
    ///
    /// On shutdown the requests already queued are still applied.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("Price sync worker started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.rx.close();
                    while let Some(request) = self.rx.recv().await {
                        self.syncer.apply(&request);
                    }
                    break;
                }
                request = self.rx.recv() => match request {
                    Some(request) => {
                        self.syncer.apply(&request);
                    }
                    None => break,
                },
            }
        }
        tracing::info!("Price sync worker stopped");
    }
}
