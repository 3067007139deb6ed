//! Stock API 模块
//!
//! `{zone}` 为 `inventory` 或 `godown`。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/transfer", post(handler::transfer))
        .route("/sync-failures", get(handler::sync_failures))
        .route("/{zone}", get(handler::list).post(handler::create))
        .route("/{zone}/low-stock", get(handler::low_stock))
        .route("/{zone}/barcode/{code}", get(handler::get_by_barcode))
        .route(
            "/{zone}/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
