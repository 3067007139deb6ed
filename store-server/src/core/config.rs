use chrono_tz::Tz;

use crate::catalog::DEFAULT_LIST_CAP;

/// 服务器配置 - 门店库存服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (`.env` 会先被加载)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 默认日志级别 (`RUST_LOG` 优先) |
/// | BUSINESS_TIMEZONE | UTC | 营业时区 (IANA 名称)，用于日期过滤和报表 |
/// | LOW_STOCK_INVENTORY | 9 | 门店低库存阈值 (含) |
/// | LOW_STOCK_GODOWN | 20 | 仓库低库存阈值 (含) |
/// | LIST_CAP | 500 | 无过滤条件时列表的最大条数 |
/// | SEED_EXAMPLE_DATA | true | 首次启动且为空库时写入示例数据 |
/// | PRICE_SYNC_QUEUE | 256 | 价格同步队列容量，0 表示同步执行 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/store BUSINESS_TIMEZONE=Asia/Kolkata cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库文件和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 默认日志级别
    pub log_level: String,
    /// 营业时区
    pub business_timezone: Tz,
    /// 门店 (inventory) 低库存阈值
    pub low_stock_inventory: u32,
    /// 仓库 (godown) 低库存阈值
    pub low_stock_godown: u32,
    /// 列表默认上限
    pub list_cap: usize,
    /// 是否写入示例数据
    pub seed_example_data: bool,
    /// 价格同步队列容量 (0 = inline)
    pub price_sync_queue: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            business_timezone: env_or("BUSINESS_TIMEZONE", chrono_tz::UTC),
            low_stock_inventory: env_or("LOW_STOCK_INVENTORY", 9),
            low_stock_godown: env_or("LOW_STOCK_GODOWN", 20),
            list_cap: env_or("LIST_CAP", DEFAULT_LIST_CAP),
            seed_example_data: env_or("SEED_EXAMPLE_DATA", true),
            price_sync_queue: env_or("PRICE_SYNC_QUEUE", 256),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join(crate::db::DB_FILE)
    }

    /// 日志目录
    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }

    /// Low-stock threshold of a zone
    pub fn low_stock_threshold(&self, zone: shared::models::Zone) -> u32 {
        match zone {
            shared::models::Zone::Inventory => self.low_stock_inventory,
            shared::models::Zone::Godown => self.low_stock_godown,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Zone;

    #[test]
    fn test_overrides_and_paths() {
        let config = Config::with_overrides("/tmp/store-test", 4000);
        assert_eq!(config.http_port, 4000);
        assert!(config.db_path().ends_with("store.redb"));
        assert!(config.log_dir().starts_with("/tmp/store-test"));
    }

    #[test]
    fn test_low_stock_threshold_per_zone() {
        let mut config = Config::with_overrides("/tmp/store-test", 4000);
        config.low_stock_inventory = 9;
        config.low_stock_godown = 20;
        assert_eq!(config.low_stock_threshold(Zone::Inventory), 9);
        assert_eq!(config.low_stock_threshold(Zone::Godown), 20);
    }
}
