// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 队列后端错误
    #[error("Queue backend error: {0}")]
    Backend(String),
}

impl From<RepositoryError> for QueueError {
    fn from(e: RepositoryError) -> Self {
        QueueError::Backend(e.to_string())
    }
}

/// 任务队列特质
///
/// 提交方只看得到队列，认领语义由底下的仓库提供。
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队一个新任务
    async fn enqueue(&self, job: &ScrapeJob) -> Result<ScrapeJob, QueueError>;
    /// 把已存在的任务重新放回队列
    async fn requeue(&self, job_id: Uuid) -> Result<(), QueueError>;
    /// 为工作器认领下一个任务
    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<ScrapeJob>, QueueError>;
}

/// 仓库背书的任务队列
///
/// 队列状态就是仓库里的任务状态，没有独立的存储。
pub struct RepositoryJobQueue<R: JobRepository> {
    repository: Arc<R>,
}

impl<R: JobRepository> RepositoryJobQueue<R> {
    /// 创建队列
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: JobRepository> JobQueue for RepositoryJobQueue<R> {
    async fn enqueue(&self, job: &ScrapeJob) -> Result<ScrapeJob, QueueError> {
        Ok(self.repository.create(job).await?)
    }

    async fn requeue(&self, job_id: Uuid) -> Result<(), QueueError> {
        Ok(self.repository.requeue(job_id).await?)
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<ScrapeJob>, QueueError> {
        Ok(self.repository.acquire_next(worker_id).await?)
    }
}

#[async_trait]
impl<T: JobQueue + ?Sized> JobQueue for Arc<T> {
    async fn enqueue(&self, job: &ScrapeJob) -> Result<ScrapeJob, QueueError> {
        (**self).enqueue(job).await
    }

    async fn requeue(&self, job_id: Uuid) -> Result<(), QueueError> {
        (**self).requeue(job_id).await
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<ScrapeJob>, QueueError> {
        (**self).dequeue(worker_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::scrape_job::JobStatus;
    use crate::infrastructure::repositories::memory::InMemoryJobRepository;

    #[tokio::test]
    async fn test_queue_round_trip() {
        let repository = Arc::new(InMemoryJobRepository::new());
        let queue = RepositoryJobQueue::new(repository);

        let job = ScrapeJob::new(
            "https://shop.ir/p/1".to_string(),
            Uuid::new_v4(),
            None,
            None,
        );
        let enqueued = queue.enqueue(&job).await.unwrap();
        assert_eq!(enqueued.status, JobStatus::Pending);

        let claimed = queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
        assert_eq!(claimed.id, job.id);
        assert_eq!(claimed.status, JobStatus::Processing);

        assert!(queue.dequeue(Uuid::new_v4()).await.unwrap().is_none());
    }
}
