use crate::db::StorageError;
use crate::utils::{AppError, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{OrderStream, Zone};
use thiserror::Error;

/// Stock and billing failures
///
/// Every precondition failure of a catalog edit, finalize or transfer is one of
/// these. `Storage` is the transient class: the request itself was fine.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Item {id} not found in {zone}")]
    NotFound { zone: Zone, id: String },

    #[error("Barcode {barcode} already exists in {zone}")]
    DuplicateBarcode { zone: Zone, barcode: String },

    #[error("Not enough {name} in stock, available: {available}")]
    InsufficientStock {
        name: String,
        available: u32,
        requested: u32,
    },

    #[error("Invalid price {price} for {name}: price must be greater than zero")]
    InvalidPrice { name: String, price: Decimal },

    #[error("Order has no items")]
    EmptyOrder,

    #[error("Payment method is required")]
    MissingPaymentMethod,

    #[error("Buyer information missing: {}", .missing.join(", "))]
    MissingBuyerInfo { missing: Vec<&'static str> },

    #[error("Product {id} no longer exists")]
    ProductVanished { id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order total {total} does not match line subtotals {expected}")]
    TotalMismatch { total: Decimal, expected: Decimal },

    #[error("Order number {order_number} already exists in the {stream} stream")]
    DuplicateOrderNumber {
        stream: OrderStream,
        order_number: String,
    },
}

pub type StockResult<T> = Result<T, StockError>;

impl From<redb::CommitError> for StockError {
    fn from(e: redb::CommitError) -> Self {
        Self::Storage(e.into())
    }
}

impl StockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(zone: Zone, id: impl Into<String>) -> Self {
        Self::NotFound {
            zone,
            id: id.into(),
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        let message = err.to_string();
        match err {
            StockError::Storage(e) => e.into(),
            StockError::NotFound { zone, id } => {
                AppError::with_message(ErrorCode::ProductNotFound, message)
                    .with_detail("zone", zone.as_str())
                    .with_detail("id", id)
            }
            StockError::DuplicateBarcode { zone, barcode } => {
                AppError::with_message(ErrorCode::ProductBarcodeExists, message)
                    .with_detail("zone", zone.as_str())
                    .with_detail("barcode", barcode)
            }
            StockError::InsufficientStock {
                name,
                available,
                requested,
            } => AppError::with_message(ErrorCode::ProductOutOfStock, message)
                .with_detail("name", name)
                .with_detail("available", available)
                .with_detail("requested", requested),
            StockError::InvalidPrice { name, price } => {
                AppError::with_message(ErrorCode::ProductInvalidPrice, message)
                    .with_detail("name", name)
                    .with_detail("price", price.to_string())
            }
            StockError::EmptyOrder => AppError::with_message(ErrorCode::OrderEmpty, message),
            StockError::MissingPaymentMethod => {
                AppError::with_message(ErrorCode::PaymentMethodRequired, message)
            }
            StockError::MissingBuyerInfo { missing } => {
                AppError::with_message(ErrorCode::BuyerInfoRequired, message)
                    .with_detail("missing", missing)
            }
            StockError::ProductVanished { id } => {
                AppError::with_message(ErrorCode::OrderProductVanished, message)
                    .with_detail("id", id)
            }
            StockError::Validation(_) => AppError::with_message(ErrorCode::ValidationFailed, message),
            StockError::TotalMismatch { .. } => {
                AppError::with_message(ErrorCode::OrderTotalMismatch, message)
            }
            StockError::DuplicateOrderNumber { order_number, .. } => {
                AppError::with_message(ErrorCode::OrderNumberExists, message)
                    .with_detail("order_number", order_number)
            }
        }
    }
}
