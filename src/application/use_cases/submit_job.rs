// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::submit_request::{SubmitBatchRequest, SubmitJobRequest};
use crate::domain::models::scrape_batch::ScrapeBatch;
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::repositories::batch_repository::BatchRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::RepositoryError;
use crate::queue::job_queue::{JobQueue, QueueError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use url::Url;
use validator::Validate;

/// 提交错误类型
#[derive(Error, Debug)]
pub enum SubmitError {
    /// 请求校验失败
    #[error("Validation failed: {0}")]
    Validation(String),
    /// 队列错误
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 单任务提交用例
pub struct SubmitJobUseCase<Q: JobQueue> {
    queue: Arc<Q>,
}

impl<Q: JobQueue> SubmitJobUseCase<Q> {
    /// 创建用例
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// 校验请求并入队任务
    pub async fn execute(&self, request: SubmitJobRequest) -> Result<ScrapeJob, SubmitError> {
        request
            .validate()
            .map_err(|e| SubmitError::Validation(e.to_string()))?;

        let job = ScrapeJob::new(
            request.url,
            request.vendor_id,
            request.supplier_id,
            request.batch_id,
        );
        let job = self.queue.enqueue(&job).await?;
        info!(job = %job.id, url = %job.url, "job submitted");
        Ok(job)
    }
}

/// 批次提交用例
pub struct SubmitBatchUseCase<Q: JobQueue, R: JobRepository, B: BatchRepository> {
    queue: Arc<Q>,
    jobs: Arc<R>,
    batches: Arc<B>,
}

impl<Q: JobQueue, R: JobRepository, B: BatchRepository> SubmitBatchUseCase<Q, R, B> {
    /// 创建用例
    pub fn new(queue: Arc<Q>, jobs: Arc<R>, batches: Arc<B>) -> Self {
        Self {
            queue,
            jobs,
            batches,
        }
    }

    /// 创建批次并入队全部成员任务
    pub async fn execute(
        &self,
        request: SubmitBatchRequest,
    ) -> Result<(ScrapeBatch, Vec<ScrapeJob>), SubmitError> {
        request
            .validate()
            .map_err(|e| SubmitError::Validation(e.to_string()))?;
        for url in &request.urls {
            Url::parse(url)
                .map_err(|e| SubmitError::Validation(format!("invalid url {}: {}", url, e)))?;
        }

        let batch = self
            .batches
            .create(&ScrapeBatch::new(request.name, request.vendor_id))
            .await?;

        let mut jobs = Vec::with_capacity(request.urls.len());
        for url in request.urls {
            let job = ScrapeJob::new(url, request.vendor_id, request.supplier_id, Some(batch.id));
            jobs.push(self.queue.enqueue(&job).await?);
        }

        // Counters reflect the new members before any worker touches them
        let (batch, _) = self
            .batches
            .recompute(batch.id, self.jobs.as_ref())
            .await?;
        info!(batch = %batch.id, jobs = jobs.len(), "batch submitted");
        Ok((batch, jobs))
    }
}
