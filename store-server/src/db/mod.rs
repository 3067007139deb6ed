//! Database Module
//!
//! Single embedded redb file holding both stock zones and both order streams.

pub mod storage;

pub use storage::{StockStorage, StorageError, StorageResult};

/// Database file name inside the work directory
pub const DB_FILE: &str = "store.redb";
