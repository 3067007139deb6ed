//! Stock API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    StockFilter, StockItem, StockItemCreate, StockItemUpdate, SyncFailure, TransferRequest,
    TransferResult, Zone,
};

use crate::api::run_blocking;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    /// 不传则使用该区域的配置阈值
    pub threshold: Option<u32>,
}

/// GET /api/stock/{zone} - 列表 (name / barcode / sort / direction / limit)
pub async fn list(
    State(state): State<ServerState>,
    Path(zone): Path<Zone>,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Vec<StockItem>>> {
    let engine = state.engine.clone();
    let items = run_blocking(move || engine.list_stock(zone, &filter)).await?;
    Ok(Json(items))
}

/// POST /api/stock/{zone} - 新增 (价格同步到另一区域的对应商品)
pub async fn create(
    State(state): State<ServerState>,
    Path(zone): Path<Zone>,
    Json(payload): Json<StockItemCreate>,
) -> AppResult<Json<StockItem>> {
    let engine = state.engine.clone();
    let item = run_blocking(move || engine.add_stock(zone, payload)).await?;
    Ok(Json(item))
}

/// GET /api/stock/{zone}/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path((zone, id)): Path<(Zone, String)>,
) -> AppResult<Json<StockItem>> {
    let engine = state.engine.clone();
    let item = run_blocking(move || engine.get_stock(zone, &id)).await?;
    Ok(Json(item))
}

/// PUT /api/stock/{zone}/{id} - 部分更新
pub async fn update(
    State(state): State<ServerState>,
    Path((zone, id)): Path<(Zone, String)>,
    Json(payload): Json<StockItemUpdate>,
) -> AppResult<Json<StockItem>> {
    let engine = state.engine.clone();
    let item = run_blocking(move || engine.edit_stock(zone, &id, payload)).await?;
    Ok(Json(item))
}

/// DELETE /api/stock/{zone}/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path((zone, id)): Path<(Zone, String)>,
) -> AppResult<Json<StockItem>> {
    let engine = state.engine.clone();
    let removed = run_blocking(move || engine.remove_stock(zone, &id)).await?;
    Ok(Json(removed))
}

/// GET /api/stock/{zone}/barcode/{code} - 扫码查询
pub async fn get_by_barcode(
    State(state): State<ServerState>,
    Path((zone, code)): Path<(Zone, String)>,
) -> AppResult<Json<StockItem>> {
    let engine = state.engine.clone();
    let lookup = code.clone();
    let item = run_blocking(move || engine.get_stock_by_barcode(zone, &lookup)).await?;
    item.map(Json).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ProductNotFound,
            format!("No item with barcode {} in {}", code, zone),
        )
        .with_detail("barcode", code)
    })
}

/// GET /api/stock/{zone}/low-stock - 低库存预警
pub async fn low_stock(
    State(state): State<ServerState>,
    Path(zone): Path<Zone>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<StockItem>>> {
    let threshold = query
        .threshold
        .unwrap_or_else(|| state.config.low_stock_threshold(zone));
    let engine = state.engine.clone();
    let items = run_blocking(move || engine.list_low_stock(zone, threshold)).await?;
    Ok(Json(items))
}

/// POST /api/stock/transfer - 仓库 → 门店调拨
pub async fn transfer(
    State(state): State<ServerState>,
    Json(payload): Json<TransferRequest>,
) -> AppResult<Json<TransferResult>> {
    let engine = state.engine.clone();
    let result = run_blocking(move || engine.transfer_stock(payload)).await?;
    Ok(Json(result))
}

/// GET /api/stock/sync-failures - 价格同步失败记录
pub async fn sync_failures(State(state): State<ServerState>) -> AppResult<Json<Vec<SyncFailure>>> {
    let engine = state.engine.clone();
    let failures = run_blocking(move || engine.list_sync_failures()).await?;
    Ok(Json(failures))
}
