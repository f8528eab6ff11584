// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 任务仓库特质
///
/// 定义抓取任务数据访问接口
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, job: &ScrapeJob) -> Result<ScrapeJob, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapeJob>, RepositoryError>;
    /// 更新任务
    async fn update(&self, job: &ScrapeJob) -> Result<ScrapeJob, RepositoryError>;
    /// 原子地认领下一个就绪任务
    ///
    /// Pending任务被认领时转入Processing；
    /// 显式重试过的任务保持Processing原样返回。
    async fn acquire_next(&self, worker_id: Uuid) -> Result<Option<ScrapeJob>, RepositoryError>;
    /// 将已存在的任务重新放回就绪队列（外部重试动作）
    async fn requeue(&self, job_id: Uuid) -> Result<(), RepositoryError>;
    /// 查找批次的全部成员任务
    async fn find_by_batch_id(&self, batch_id: Uuid) -> Result<Vec<ScrapeJob>, RepositoryError>;
}
