// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_batch::ScrapeBatch;
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 批次仓库特质
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// 创建新批次
    async fn create(&self, batch: &ScrapeBatch) -> Result<ScrapeBatch, RepositoryError>;
    /// 根据ID查找批次
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapeBatch>, RepositoryError>;
    /// 在单写者保护下读取成员任务并重算批次统计
    ///
    /// 成员读取与计数写回必须发生在同一个临界区内。
    /// 多个工作器同时收尾时串行执行，后写入的计数永远
    /// 来自更新的成员快照。返回重算后的批次和所用快照。
    async fn recompute(
        &self,
        batch_id: Uuid,
        members: &dyn JobRepository,
    ) -> Result<(ScrapeBatch, Vec<ScrapeJob>), RepositoryError>;
    /// 保存批次报告快照，已有报告时保留首份
    async fn store_report(
        &self,
        batch_id: Uuid,
        report: serde_json::Value,
    ) -> Result<(), RepositoryError>;
}
