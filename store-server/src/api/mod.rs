//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`stock`] - 库存 (inventory / godown)、调拨、价格同步失败记录
//! - [`orders`] - 订单查询、预览、结账
//! - [`reports`] - 销售报表

pub mod health;
pub mod orders;
pub mod reports;
pub mod stock;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::stock::StockResult;
use crate::utils::{AppError, AppResult};

/// 完整路由 (含中间件)
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(stock::router())
        .merge(orders::router())
        .merge(reports::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 在阻塞线程池上执行存储操作 (redb 为同步 IO)
pub(crate) async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> StockResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {}", e)))?
        .map_err(AppError::from)
}
