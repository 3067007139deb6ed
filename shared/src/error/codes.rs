//! Numeric error codes
//!
//! Each code is declared once in the table below; the enum, its default
//! message and the `u16` conversion are generated from it.
//!
//! | Range | Domain |
//! |-------|--------|
//! | 0xxx | general |
//! | 4xxx | orders and invoices |
//! | 5xxx | payment |
//! | 6xxx | stock items |
//! | 9xxx | system, 94xx storage |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

macro_rules! error_codes {
    ($($(#[$meta:meta])* $name:ident = $value:literal => $message:literal,)+) => {
        /// Error code carried by every failed response, serialized as a number
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $($(#[$meta])* $name = $value,)+
        }

        impl ErrorCode {
            /// Default English message
            pub const fn message(&self) -> &'static str {
                match self {
                    $(ErrorCode::$name => $message,)+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(ErrorCode::$name),)+
                    other => Err(InvalidErrorCode(other)),
                }
            }
        }
    };
}

error_codes! {
    Success = 0 => "OK",
    ValidationFailed = 2 => "Validation failed",
    NotFound = 3 => "Not found",

    OrderNotFound = 4001 => "Order not found",
    /// Finalize called with no lines
    OrderEmpty = 4007 => "Order has no items",
    OrderTotalMismatch = 4008 => "Order total does not match its lines",
    /// Number already used in the same stream
    OrderNumberExists = 4009 => "Order number already exists",
    /// Franchise invoice without buyer name, phone or city
    BuyerInfoRequired = 4010 => "Buyer details are required for franchise invoices",
    /// Item deleted between drafting and finalize
    OrderProductVanished = 4011 => "A product in the order no longer exists",

    PaymentMethodRequired = 5006 => "Payment method is required",

    ProductNotFound = 6001 => "Product not found",
    /// Price is zero or negative
    ProductInvalidPrice = 6002 => "Price must be greater than zero",
    ProductOutOfStock = 6003 => "Not enough stock",
    /// Barcode taken within the zone
    ProductBarcodeExists = 6004 => "Barcode already exists",

    InternalError = 9001 => "Internal server error",
    StorageFull = 9401 => "Storage full",
    OutOfMemory = 9402 => "Out of memory",
    /// Data file damaged or inconsistent
    StorageCorrupted = 9403 => "Storage corrupted",
    /// Writer lock or file busy, retry
    SystemBusy = 9404 => "Store busy, retry shortly",
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A number that is not in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown error code {0}")]
pub struct InvalidErrorCode(pub u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values_are_stable() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4007);
        assert_eq!(ErrorCode::PaymentMethodRequired.code(), 5006);
        assert_eq!(ErrorCode::ProductOutOfStock.code(), 6003);
        assert_eq!(ErrorCode::SystemBusy.code(), 9404);
    }

    #[test]
    fn test_lookup_by_number() {
        for code in [
            ErrorCode::NotFound,
            ErrorCode::BuyerInfoRequired,
            ErrorCode::ProductBarcodeExists,
            ErrorCode::StorageCorrupted,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_wire_form_is_a_number() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::ProductOutOfStock).unwrap(),
            "6003"
        );
        let code: ErrorCode = serde_json::from_str("4007").unwrap();
        assert_eq!(code, ErrorCode::OrderEmpty);
        assert!(serde_json::from_str::<ErrorCode>("1234").is_err());
    }
}
