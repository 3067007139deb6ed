use thiserror::Error;

use crate::db::StorageError;
use crate::stock::StockError;

/// 启动和运行期错误 (HTTP 处理器使用 `AppError`)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("存储初始化失败: {0}")]
    Storage(#[from] StorageError),

    #[error("数据初始化失败: {0}")]
    Provisioning(#[from] StockError),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
