use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::db::StockStorage;
use crate::provisioning;
use crate::reports::ReportService;
use crate::stock::{PriceSyncWorker, StockEngine};

const STORAGE_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价 Clone (内部 `Arc`)。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | StockStorage | redb 存储 |
/// | engine | StockEngine | 库存、结账、调拨、价格同步 |
/// | reports | ReportService | 销售报表 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (redb)
    pub storage: StockStorage,
    /// 库存引擎
    pub engine: StockEngine,
    /// 报表服务
    pub reports: ReportService,
    /// 等待启动的价格同步 worker (启动后为 None)
    sync_worker: Arc<Mutex<Option<PriceSyncWorker>>>,
}

impl ServerState {
    /// 用已打开的存储构造状态 (不做首次数据初始化)
    ///
    /// `price_sync_queue` 为 0 时价格同步在请求线程内执行。
    pub fn with_storage(config: Config, storage: StockStorage) -> Self {
        let mut engine = StockEngine::new(storage.clone(), config.business_timezone, config.list_cap);
        let mut sync_worker = None;
        if config.price_sync_queue > 0 {
            let (worker, dispatch) = PriceSyncWorker::channel(storage.clone(), config.price_sync_queue);
            engine = engine.with_sync_dispatch(dispatch);
            sync_worker = Some(worker);
        }
        let reports = ReportService::new(engine.ledger().clone());

        Self {
            config,
            storage,
            engine,
            reports,
            sync_worker: Arc::new(Mutex::new(sync_worker)),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (work_dir/store.redb)
    /// 3. 首次启动数据 (示例数据)
    /// 4. 各服务
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.db_path();
        tracing::info!(path = %db_path.display(), "Opening store database");
        let storage = StockStorage::open(&db_path)?;

        let outcome = provisioning::provision(&storage, config.business_timezone, config.seed_example_data)?;
        tracing::info!(?outcome, "Provisioning checked");

        Ok(Self::with_storage(config.clone(), storage))
    }

    /// 启动后台任务
    ///
    /// - 价格同步 worker (如果启用了队列)
    /// - 存储巡检 (定时 ping 数据库)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let worker = self
            .sync_worker
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(worker) = worker {
            let token = tasks.shutdown_token();
            tasks.spawn("price_sync", TaskKind::Worker, worker.run(token));
        }

        let storage = self.storage.clone();
        let token = tasks.shutdown_token();
        tasks.spawn("storage_check", TaskKind::Periodic, async move {
            let mut interval = tokio::time::interval(STORAGE_CHECK_INTERVAL);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(e) = storage.ping() {
                            tracing::error!(error = %e, "Storage check failed");
                        }
                    }
                }
            }
        });

        tasks.log_summary();
        tasks
    }
}
