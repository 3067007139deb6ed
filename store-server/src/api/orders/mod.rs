//! Order API Module
//!
//! `{stream}` 为 `standard` (ORD-) 或 `franchise` (FINV-)。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::query))
        .route("/by-id/{id}", get(handler::get_by_id))
        .route("/{stream}/next-number", get(handler::next_number))
        .route("/{stream}/preview", post(handler::preview))
        .route("/{stream}/finalize", post(handler::finalize))
}
