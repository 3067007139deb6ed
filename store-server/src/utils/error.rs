//! 统一错误处理
//!
//! Error types come from `shared::error`; this module adds the server-side
//! conversions from storage failures.
//!
//! # 使用示例
//!
//! ```ignore
//! let item = state.engine.get_stock(zone, &id)?;
//! Ok(Json(item))
//! ```

use crate::db::StorageError;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 将存储错误转换为错误码
pub fn classify_storage_error(e: &StorageError) -> ErrorCode {
    // 先按枚举变体精确匹配
    match e {
        StorageError::Serialization(_) => return ErrorCode::InternalError,
        StorageError::DanglingOrder(_) => return ErrorCode::StorageCorrupted,
        _ => {}
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return ErrorCode::OutOfMemory;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    // 默认：系统繁忙（redb 的 Database/Transaction/Table/Storage/Commit 错误）
    ErrorCode::SystemBusy
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        let code = classify_storage_error(&e);
        tracing::error!(error = %e, error_code = %code, "Storage error occurred");
        AppError::with_message(code, code.message()).with_detail("cause", e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_is_internal() {
        let err: StorageError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(classify_storage_error(&err), ErrorCode::InternalError);
    }

    #[test]
    fn test_dangling_order_is_corruption() {
        let err = StorageError::DanglingOrder("o1".into());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::StorageCorrupted);
        assert!(app.code.category().is_infrastructure());
    }
}
