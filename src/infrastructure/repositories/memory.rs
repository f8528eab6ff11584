// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::product::Product;
use crate::domain::models::scrape_batch::ScrapeBatch;
use crate::domain::models::scrape_job::{JobStatus, ScrapeJob};
use crate::domain::repositories::batch_repository::BatchRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 内存任务仓库
///
/// DashMap保存任务实体，单独的FIFO队列保存就绪任务ID，
/// 认领按提交顺序进行。
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: DashMap<Uuid, ScrapeJob>,
    ready: Mutex<VecDeque<Uuid>>,
}

impl InMemoryJobRepository {
    /// 创建空仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &ScrapeJob) -> Result<ScrapeJob, RepositoryError> {
        self.jobs.insert(job.id, job.clone());
        self.ready.lock().push_back(job.id);
        Ok(job.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapeJob>, RepositoryError> {
        Ok(self.jobs.get(&id).map(|j| j.value().clone()))
    }

    async fn update(&self, job: &ScrapeJob) -> Result<ScrapeJob, RepositoryError> {
        if !self.jobs.contains_key(&job.id) {
            return Err(RepositoryError::NotFound);
        }
        self.jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn acquire_next(&self, worker_id: Uuid) -> Result<Option<ScrapeJob>, RepositoryError> {
        loop {
            let id = match self.ready.lock().pop_front() {
                Some(id) => id,
                None => return Ok(None),
            };

            let Some(mut entry) = self.jobs.get_mut(&id) else {
                continue;
            };

            match entry.status {
                JobStatus::Pending => {
                    let started = entry
                        .clone()
                        .start()
                        .map_err(|e| RepositoryError::Database(e.to_string()))?;
                    *entry = started.clone();
                    debug!(job = %id, worker = %worker_id, "job claimed");
                    return Ok(Some(started));
                }
                // An explicitly retried job is already in Processing
                JobStatus::Processing => {
                    debug!(job = %id, worker = %worker_id, "retried job claimed");
                    return Ok(Some(entry.clone()));
                }
                _ => continue,
            }
        }
    }

    async fn requeue(&self, job_id: Uuid) -> Result<(), RepositoryError> {
        if !self.jobs.contains_key(&job_id) {
            return Err(RepositoryError::NotFound);
        }
        self.ready.lock().push_back(job_id);
        Ok(())
    }

    async fn find_by_batch_id(&self, batch_id: Uuid) -> Result<Vec<ScrapeJob>, RepositoryError> {
        let mut jobs: Vec<ScrapeJob> = self
            .jobs
            .iter()
            .filter(|j| j.batch_id == Some(batch_id))
            .map(|j| j.value().clone())
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }
}

/// 内存批次仓库
///
/// 每个批次配一把刷新锁，成员读取和计数写回在同一个
/// 临界区内完成，并发收尾的工作器被串行化。
#[derive(Debug, Default)]
pub struct InMemoryBatchRepository {
    batches: DashMap<Uuid, ScrapeBatch>,
    refresh_locks: DashMap<Uuid, Arc<tokio::sync::Mutex<()>>>,
}

impl InMemoryBatchRepository {
    /// 创建空仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn create(&self, batch: &ScrapeBatch) -> Result<ScrapeBatch, RepositoryError> {
        self.batches.insert(batch.id, batch.clone());
        Ok(batch.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapeBatch>, RepositoryError> {
        Ok(self.batches.get(&id).map(|b| b.value().clone()))
    }

    async fn recompute(
        &self,
        batch_id: Uuid,
        members: &dyn JobRepository,
    ) -> Result<(ScrapeBatch, Vec<ScrapeJob>), RepositoryError> {
        let lock = self
            .refresh_locks
            .entry(batch_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .value()
            .clone();
        // Member read and counter write share one critical section
        let _guard = lock.lock().await;

        let jobs = members.find_by_batch_id(batch_id).await?;
        let mut entry = self
            .batches
            .get_mut(&batch_id)
            .ok_or(RepositoryError::NotFound)?;
        entry.recompute(&jobs);
        Ok((entry.clone(), jobs))
    }

    async fn store_report(
        &self,
        batch_id: Uuid,
        report: serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let mut entry = self
            .batches
            .get_mut(&batch_id)
            .ok_or(RepositoryError::NotFound)?;
        if entry.report.is_none() {
            entry.report = Some(report);
        }
        Ok(())
    }
}

/// 内存商品仓库
///
/// slug索引充当唯一约束，先占索引再写实体。
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: DashMap<Uuid, Product>,
    slugs: DashMap<String, Uuid>,
}

impl InMemoryProductRepository {
    /// 创建空仓库
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: &Product) -> Result<Product, RepositoryError> {
        match self.slugs.entry(product.slug.clone()) {
            Entry::Occupied(_) => {
                return Err(RepositoryError::UniqueViolation(product.slug.clone()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(product.id);
            }
        }
        self.products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.get(&id).map(|p| p.value().clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let Some(id) = self.slugs.get(slug).map(|id| *id.value()) else {
            return Ok(None);
        };
        Ok(self.products.get(&id).map(|p| p.value().clone()))
    }
}
