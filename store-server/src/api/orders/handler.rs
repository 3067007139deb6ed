//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{
    BuyerInfo, DraftLine, FinalizeRequest, Order, OrderFilter, OrderPreview, OrderStream,
    PaymentMethod, SortDirection, StreamSelector,
};

use crate::api::run_blocking;
use crate::core::ServerState;
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 订单查询参数 (日期格式 YYYY-MM-DD，营业时区，含两端)
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub stream: StreamSelector,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub order_number: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub city: Option<String>,
    pub direction: Option<SortDirection>,
    pub limit: Option<usize>,
}

impl OrderQuery {
    fn into_filter(self) -> AppResult<(StreamSelector, OrderFilter)> {
        let start_date = self.start_date.as_deref().map(parse_date).transpose()?;
        let end_date = self.end_date.as_deref().map(parse_date).transpose()?;
        if let (Some(start), Some(end)) = (start_date, end_date)
            && start > end
        {
            return Err(AppError::validation("start_date must not be after end_date"));
        }
        Ok((
            self.stream,
            OrderFilter {
                start_date,
                end_date,
                order_number: self.order_number,
                buyer_name: self.buyer_name,
                buyer_phone: self.buyer_phone,
                city: self.city,
                direction: self.direction,
                limit: self.limit,
            },
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct PreviewPayload {
    pub lines: Vec<DraftLine>,
}

#[derive(Debug, Deserialize)]
pub struct FinalizePayload {
    pub lines: Vec<DraftLine>,
    pub payment_method: Option<PaymentMethod>,
    pub buyer: Option<BuyerInfo>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NextNumberResponse {
    pub stream: OrderStream,
    pub order_number: String,
}

/// GET /api/orders - 订单查询
pub async fn query(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let (selector, filter) = query.into_filter()?;
    let engine = state.engine.clone();
    let orders = run_blocking(move || engine.query_orders(selector, &filter)).await?;
    Ok(Json(orders))
}

/// GET /api/orders/by-id/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let engine = state.engine.clone();
    let lookup = id.clone();
    let order = run_blocking(move || engine.get_order(&lookup)).await?;
    order.map(Json).ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
    })
}

/// GET /api/orders/{stream}/next-number - 下一个单号 (只读预览)
pub async fn next_number(
    State(state): State<ServerState>,
    Path(stream): Path<OrderStream>,
) -> AppResult<Json<NextNumberResponse>> {
    let engine = state.engine.clone();
    let order_number = run_blocking(move || engine.next_order_number(stream)).await?;
    Ok(Json(NextNumberResponse {
        stream,
        order_number,
    }))
}

/// POST /api/orders/{stream}/preview - 按当前库存计价，不落库
pub async fn preview(
    State(state): State<ServerState>,
    Path(stream): Path<OrderStream>,
    Json(payload): Json<PreviewPayload>,
) -> AppResult<Json<OrderPreview>> {
    let engine = state.engine.clone();
    let preview = run_blocking(move || engine.preview_order(stream, &payload.lines)).await?;
    Ok(Json(preview))
}

/// POST /api/orders/{stream}/finalize - 结账
pub async fn finalize(
    State(state): State<ServerState>,
    Path(stream): Path<OrderStream>,
    Json(payload): Json<FinalizePayload>,
) -> AppResult<Json<Order>> {
    let request = FinalizeRequest {
        stream,
        lines: payload.lines,
        payment_method: payload.payment_method,
        buyer: payload.buyer,
        idempotency_key: payload.idempotency_key,
    };
    let engine = state.engine.clone();
    let order = run_blocking(move || engine.finalize_order(request)).await?;
    Ok(Json(order))
}
