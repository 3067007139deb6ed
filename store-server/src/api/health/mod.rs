//! 健康检查
//!
//! `GET /health` 打开一个读事务并统计各区域商品数和各流水订单数。
//! 存储不可读时返回 `degraded`，HTTP 状态仍为 200。
//!
//! ```json
//! { "status": "healthy", "version": "0.1.0", "uptime_seconds": 42,
//!   "store": { "inventory_items": 3, "godown_items": 3, "standard_orders": 1, "franchise_invoices": 1 } }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Instant;

use crate::core::ServerState;
use crate::db::{StockStorage, StorageResult};
use shared::models::{OrderStream, Zone};

static STARTED: OnceLock<Instant> = OnceLock::new();

pub fn router() -> Router<ServerState> {
    STARTED.get_or_init(Instant::now);
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// healthy | degraded
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreCounts {
    pub inventory_items: u64,
    pub godown_items: u64,
    pub standard_orders: u64,
    pub franchise_invoices: u64,
}

fn store_counts(storage: &StockStorage) -> StorageResult<StoreCounts> {
    storage.ping()?;
    Ok(StoreCounts {
        inventory_items: storage.count_items(Zone::Inventory)?,
        godown_items: storage.count_items(Zone::Godown)?,
        standard_orders: storage.count_orders(OrderStream::Standard)?,
        franchise_invoices: storage.count_orders(OrderStream::Franchise)?,
    })
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let storage = state.storage.clone();
    let counts = tokio::task::spawn_blocking(move || store_counts(&storage)).await;

    let (store, error) = match counts {
        Ok(Ok(counts)) => (Some(counts), None),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Health check could not read the store");
            (None, Some(e.to_string()))
        }
        Err(e) => (None, Some(e.to_string())),
    };

    Json(HealthResponse {
        status: if store.is_some() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: STARTED.get().map(|t| t.elapsed().as_secs()).unwrap_or(0),
        store,
        error,
    })
}
