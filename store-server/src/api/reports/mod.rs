//! 销售报表路由
//!
//! | 路径 | 方法 | 参数 |
//! |------|------|------|
//! | /api/reports | GET | `period` (weekly / monthly / yearly)，`stream` (all / standard / franchise) |

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::models::{ReportPeriod, ReportResult, StreamSelector};

use crate::api::run_blocking;
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/reports", get(report))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
    #[serde(default)]
    pub stream: StreamSelector,
}

/// GET /api/reports
pub async fn report(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<ReportResult>> {
    let reports = state.reports.clone();
    let result = run_blocking(move || reports.compute(query.period, query.stream)).await?;
    Ok(Json(result))
}
