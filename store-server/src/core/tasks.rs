//! 后台任务
//!
//! 所有后台任务共用一个 [`CancellationToken`]；`shutdown` 取消令牌后逐个 join。
//! 任务 panic 只记录日志，不影响 HTTP 服务。

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// 常驻消费者 (价格同步队列)
    Worker,
    /// 定时执行 (存储巡检)
    Periodic,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Worker => "worker",
            TaskKind::Periodic => "periodic",
        }
    }
}

pub struct BackgroundTasks {
    token: CancellationToken,
    handles: Vec<(&'static str, TaskKind, JoinHandle<()>)>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.token.clone();
        let handle = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(task).catch_unwind().await;
            match outcome {
                Ok(()) if token.is_cancelled() => {
                    tracing::debug!(task = name, "Background task stopped");
                }
                Ok(()) => {
                    tracing::warn!(task = name, kind = kind.as_str(), "Background task exited before shutdown");
                }
                Err(payload) => {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_default();
                    tracing::error!(task = name, kind = kind.as_str(), %reason, "Background task panicked");
                }
            }
        });
        self.handles.push((name, kind, handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 在 shutdown 之前就已结束的任务
    pub fn stopped(&self) -> Vec<&'static str> {
        self.handles
            .iter()
            .filter(|(_, _, handle)| handle.is_finished())
            .map(|(name, _, _)| *name)
            .collect()
    }

    pub fn log_summary(&self) {
        let names: Vec<String> = self
            .handles
            .iter()
            .map(|(name, kind, _)| format!("{name} ({})", kind.as_str()))
            .collect();
        tracing::info!(count = self.handles.len(), tasks = %names.join(", "), "Background tasks started");
    }

    /// 取消并等待全部任务 (价格同步 worker 会先清空队列)
    pub async fn shutdown(self) {
        self.token.cancel();
        for (name, _, handle) in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(task = name, error = %e, "Background task join failed");
            }
        }
        tracing::info!("Background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
