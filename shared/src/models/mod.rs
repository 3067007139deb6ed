//! Data models
//!
//! Shared between store-server and its clients (via API).
//! Prices are `rust_decimal::Decimal` serialized as strings, timestamps are Unix millis.

pub mod order;
pub mod report;
pub mod stock;

// Re-exports
pub use order::*;
pub use report::*;
pub use stock::*;
