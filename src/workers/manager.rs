// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::batch_repository::BatchRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::queue::job_queue::JobQueue;
use crate::workers::scrape_worker::ScrapeWorker;
use tokio::task::JoinHandle;
use tracing::info;

/// 工作器管理器
///
/// 持有全部工作器任务句柄，负责优雅停机。
#[derive(Default)]
pub struct WorkerManager {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    /// 创建空管理器
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动一个工作器
    pub fn spawn<Q, R, B, P>(&mut self, worker: ScrapeWorker<Q, R, B, P>)
    where
        Q: JobQueue + Send + Sync + 'static,
        R: JobRepository + Send + Sync + 'static,
        B: BatchRepository + Send + Sync + 'static,
        P: ProductRepository + Send + Sync + 'static,
    {
        self.handles.push(tokio::spawn(worker.run()));
    }

    /// 当前工作器数量
    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// 等待Ctrl-C信号后停机
    pub async fn wait_for_shutdown(self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for shutdown signal: {}", e);
        }
        info!("shutdown signal received, stopping workers");
        self.abort();
    }

    /// 立即停止全部工作器
    pub fn abort(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}
