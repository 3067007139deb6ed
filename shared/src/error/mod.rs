//! Error codes and the API error type
//!
//! Server code raises domain errors and converts them into [`AppError`], which
//! renders as an [`ApiResponse`] body with the status of its [`ErrorCode`].
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::ProductOutOfStock, "Not enough Apple in stock, available: 7")
//!     .with_detail("available", 7);
//! assert_eq!(ApiResponse::<()>::error(&err).code, Some(6003));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
