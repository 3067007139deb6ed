//! Store Server - 门店库存与开单服务
//!
//! # 架构概述
//!
//! 两个库存区域 (门店 inventory / 仓库 godown)，两条订单流水
//! (门店销售 `ORD-` / 加盟发票 `FINV-`)，全部存放在一个 redb 文件中。
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── db/            # redb 存储层
//! ├── catalog/       # 分区域商品 CRUD
//! ├── ledger/        # 订单流水、单号
//! ├── stock/         # 结账、调拨、价格同步
//! ├── reports/       # 销售报表
//! ├── provisioning   # 首次启动示例数据
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、时间、日志
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod db;
pub mod ledger;
pub mod provisioning;
pub mod reports;
pub mod stock;
pub mod utils;

// Re-export 公共类型
pub use catalog::CatalogStore;
pub use core::{Config, Server, ServerState};
pub use db::StockStorage;
pub use ledger::OrderLedger;
pub use reports::{ReportService, compute_report};
pub use stock::{StockEngine, StockError, StockResult};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`，创建工作目录，初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = config.log_dir();
    let log_dir = log_dir.to_string_lossy();
    let log_dir = (!config.is_development()).then_some(log_dir.as_ref());
    init_logger_with_file(&config.log_level, config.is_production(), log_dir)?;
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ____  _                    ____
 / ___|| |_ ___  _ __ ___   / ___|  ___ _ ____   _____ _ __
 \___ \| __/ _ \| '__/ _ \  \___ \ / _ \ '__\ \ / / _ \ '__|
  ___) | || (_) | | |  __/   ___) |  __/ |   \ V /  __/ |
 |____/ \__\___/|_|  \___|  |____/ \___|_|    \_/ \___|_|
    "#
    );
}
