//! Stock movements: checkout, godown transfers and cross-zone price sync

pub mod draft;
pub mod engine;
pub mod error;
pub mod sync;

pub use draft::DraftOrder;
pub use engine::StockEngine;
pub use error::{StockError, StockResult};
pub use sync::{EditOrigin, PriceSyncWorker, PriceSyncer, SyncAction, SyncDispatch, SyncRequest, reconcile};
