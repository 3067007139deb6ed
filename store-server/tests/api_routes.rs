//! HTTP 路由测试 (内存库，不监听端口)

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use store_server::api::build_router;
use store_server::{Config, ServerState, StockStorage};
use tower::ServiceExt;

fn app() -> Router {
    let mut config = Config::with_overrides("./target/api-test", 0);
    config.price_sync_queue = 0;
    config.business_timezone = chrono_tz::UTC;
    let state = ServerState::with_storage(config, StockStorage::open_in_memory().unwrap());
    build_router(state)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn add_item(app: &Router, zone: &str, name: &str, price: &str, quantity: u32, barcode: &str) -> Value {
    let (status, item) = call(
        app,
        Method::POST,
        &format!("/api/stock/{zone}"),
        Some(json!({ "name": name, "price": price, "quantity": quantity, "barcode": barcode })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{item}");
    item
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["inventory_items"], 0);
}

#[tokio::test]
async fn stock_crud_round() {
    let app = app();
    let apple = add_item(&app, "inventory", "Apple", "3.00", 10, "APL-1").await;
    let id = apple["id"].as_str().unwrap();
    assert_eq!(apple["price"], "3.00");

    let (status, fetched) = call(&app, Method::GET, &format!("/api/stock/inventory/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Apple");

    let (status, by_code) = call(&app, Method::GET, "/api/stock/inventory/barcode/APL-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_code["id"], id);

    let (status, _) = call(&app, Method::GET, "/api/stock/godown/barcode/APL-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/stock/inventory/{id}"),
        Some(json!({ "quantity": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 4);

    let (status, low) = call(&app, Method::GET, "/api/stock/inventory/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(low.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/stock/inventory/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, listed) = call(&app, Method::GET, "/api/stock/inventory", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_barcode_is_conflict() {
    let app = app();
    add_item(&app, "godown", "Rice", "90.00", 50, "RICE-10").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/stock/godown",
        Some(json!({ "name": "Rice Bag", "price": "80.00", "quantity": 5, "barcode": "RICE-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("RICE-10"));
}

#[tokio::test]
async fn preview_then_finalize() {
    let app = app();
    let apple = add_item(&app, "inventory", "Apple", "3.00", 10, "APL-1").await;
    let lines = json!([{ "stock_item_id": apple["id"], "quantity": 3 }]);

    let (status, preview) = call(
        &app,
        Method::POST,
        "/api/orders/standard/preview",
        Some(json!({ "lines": lines })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["order_number"], "ORD-0001");
    assert_eq!(preview["total_amount"], "9.00");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/orders/standard/finalize",
        Some(json!({ "lines": lines })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, order) = call(
        &app,
        Method::POST,
        "/api/orders/standard/finalize",
        Some(json!({ "lines": lines, "payment_method": "cash", "idempotency_key": "k-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["order_number"], "ORD-0001");

    let (status, next) = call(&app, Method::GET, "/api/orders/standard/next-number", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(next["order_number"], "ORD-0002");

    let (status, fetched) = call(
        &app,
        Method::GET,
        &format!("/api/orders/by-id/{}", order["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["total_amount"], "9.00");

    let (status, listed) = call(&app, Method::GET, "/api/orders?stream=standard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn over_request_is_conflict() {
    let app = app();
    let apple = add_item(&app, "inventory", "Apple", "3.00", 2, "APL-1").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/orders/standard/finalize",
        Some(json!({
            "lines": [{ "stock_item_id": apple["id"], "quantity": 5 }],
            "payment_method": "online"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["available"], 2);
}

#[tokio::test]
async fn unknown_order_and_bad_dates() {
    let app = app();
    let (status, _) = call(&app, Method::GET, "/api/orders/by-id/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::GET,
        "/api/orders?start_date=2024-03-10&end_date=2024-03-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transfer_and_report() {
    let app = app();
    let rice = add_item(&app, "godown", "Rice", "90.00", 50, "RICE-10").await;

    let (status, moved) = call(
        &app,
        Method::POST,
        "/api/stock/transfer",
        Some(json!({ "godown_item_id": rice["id"], "quantity": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["created"], true);
    assert_eq!(moved["godown_item"]["quantity"], 40);

    let (status, report) = call(&app, Method::GET, "/api/reports?period=monthly", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["buckets"].as_array().unwrap().len(), 12);
    assert_eq!(report["total_orders"], 0);
    assert_eq!(report["average_order_value"], "0");

    let (status, failures) = call(&app, Method::GET, "/api/stock/sync-failures", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(failures.as_array().unwrap().is_empty());
}
