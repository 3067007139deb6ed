//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            Success => StatusCode::OK,
            NotFound | OrderNotFound | ProductNotFound => StatusCode::NOT_FOUND,
            // Stock moved or a uniqueness rule was hit: same request may succeed later
            ProductBarcodeExists | OrderNumberExists | ProductOutOfStock | OrderProductVanished => {
                StatusCode::CONFLICT
            }
            SystemBusy => StatusCode::SERVICE_UNAVAILABLE,
            InternalError | StorageFull | OutOfMemory | StorageCorrupted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ValidationFailed | OrderEmpty | OrderTotalMismatch | BuyerInfoRequired
            | PaymentMethodRequired | ProductInvalidPrice => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_miss_with_404() {
        assert_eq!(ErrorCode::ProductNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_stock_races_are_conflicts() {
        assert_eq!(ErrorCode::ProductOutOfStock.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::OrderProductVanished.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::ProductBarcodeExists.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_checkout_input_errors_are_bad_requests() {
        for code in [
            ErrorCode::OrderEmpty,
            ErrorCode::PaymentMethodRequired,
            ErrorCode::BuyerInfoRequired,
            ErrorCode::ProductInvalidPrice,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_storage_statuses() {
        assert_eq!(ErrorCode::SystemBusy.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ErrorCode::StorageCorrupted.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
