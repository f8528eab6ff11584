// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::{DomainError, ScrapeJob};
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::RepositoryError;
use crate::queue::job_queue::{JobQueue, QueueError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// 重试错误类型
#[derive(Error, Debug)]
pub enum RetryError {
    /// 任务不存在
    #[error("Job not found")]
    NotFound,
    /// 状态不允许重试
    #[error(transparent)]
    InvalidState(#[from] DomainError),
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 队列错误
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// 失败任务重试用例
///
/// 重试是离开Failed状态的唯一路径，由操作人员显式触发。
pub struct RetryJobUseCase<R: JobRepository, Q: JobQueue> {
    jobs: Arc<R>,
    queue: Arc<Q>,
}

impl<R: JobRepository, Q: JobQueue> RetryJobUseCase<R, Q> {
    /// 创建用例
    pub fn new(jobs: Arc<R>, queue: Arc<Q>) -> Self {
        Self { jobs, queue }
    }

    /// 重试一个失败任务
    pub async fn execute(&self, job_id: Uuid) -> Result<ScrapeJob, RetryError> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(RetryError::NotFound)?;

        let retried = job.retry()?;
        let saved = self.jobs.update(&retried).await?;
        self.queue.requeue(saved.id).await?;

        info!(job = %saved.id, retry_count = saved.retry_count, "job requeued for retry");
        Ok(saved)
    }
}
