// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::batch_report::BatchReport;
use crate::domain::repositories::batch_repository::BatchRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::platform_detector;
use crate::domain::services::product_materializer::ProductMaterializer;
use crate::engines::fetcher::Fetcher;
use crate::queue::job_queue::JobQueue;
use crate::utils::errors::ErrorHandler;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 抓取工作器
///
/// 串起完整流水线：认领 → 抓取 → 平台检测 → 抽取 →
/// 质量评估 → 落库 → 终态写回 → 批次重算。
/// 每个任务带独立的错误累加器，工作器本身从不panic。
pub struct ScrapeWorker<Q, R, B, P>
where
    Q: JobQueue,
    R: JobRepository,
    B: BatchRepository,
    P: ProductRepository,
{
    worker_id: Uuid,
    queue: Arc<Q>,
    jobs: Arc<R>,
    batches: Arc<B>,
    fetcher: Arc<Fetcher>,
    extraction: Arc<ExtractionService>,
    materializer: Arc<ProductMaterializer<P>>,
    auto_materialize: bool,
    idle_poll: Duration,
}

impl<Q, R, B, P> ScrapeWorker<Q, R, B, P>
where
    Q: JobQueue + 'static,
    R: JobRepository + 'static,
    B: BatchRepository + 'static,
    P: ProductRepository + 'static,
{
    /// 创建工作器
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<Q>,
        jobs: Arc<R>,
        batches: Arc<B>,
        fetcher: Arc<Fetcher>,
        extraction: Arc<ExtractionService>,
        materializer: Arc<ProductMaterializer<P>>,
        auto_materialize: bool,
    ) -> Self {
        Self {
            worker_id: Uuid::new_v4(),
            queue,
            jobs,
            batches,
            fetcher,
            extraction,
            materializer,
            auto_materialize,
            idle_poll: Duration::from_millis(500),
        }
    }

    /// 工作器主循环
    ///
    /// 队列为空时退避轮询，队列错误不会终止循环。
    pub async fn run(self) {
        info!(worker = %self.worker_id, "scrape worker started");
        loop {
            match self.queue.dequeue(self.worker_id).await {
                Ok(Some(job)) => {
                    let job_id = job.id;
                    if let Err(e) = self.process_job(job).await {
                        error!(job = %job_id, "job processing error: {:#}", e);
                    }
                }
                Ok(None) => sleep(self.idle_poll).await,
                Err(e) => {
                    error!(worker = %self.worker_id, "dequeue failed: {}", e);
                    sleep(self.idle_poll).await;
                }
            }
        }
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, url = %job.url, worker = %self.worker_id))]
    async fn process_job(&self, job: ScrapeJob) -> anyhow::Result<()> {
        let started = Instant::now();
        let mut handler = ErrorHandler::new();

        let document = match self.fetcher.fetch(&job.url, &mut handler).await {
            Ok(document) => document,
            Err(_) => return self.finish_failed(job, handler).await,
        };

        let platform = platform_detector::detect(&document.html);
        debug!(%platform, status = document.status_code, "page fetched");

        let data =
            self.extraction
                .extract(&document.html, &document.final_url, platform, &mut handler);

        let mut product_id = None;
        if self.auto_materialize && data.name.is_some() {
            match self.materializer.materialize(&job, &data, &mut handler).await {
                Ok(product) => product_id = Some(product.id),
                Err(e) => handler.add_error(e),
            }
        }

        if handler.has_critical_errors() {
            return self.finish_failed(job, handler).await;
        }

        let mut finished = if handler.has_warnings() {
            job.complete_with_warnings(data, handler.report())?
        } else {
            job.complete(data)?
        };
        if let Some(id) = product_id {
            finished.attach_product(id)?;
        }

        metrics::counter!("jobs_completed_total").increment(1);
        metrics::histogram!("job_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            status = %finished.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "job finished"
        );

        self.jobs.update(&finished).await?;
        self.refresh_batch(&finished).await?;
        Ok(())
    }

    async fn finish_failed(&self, job: ScrapeJob, handler: ErrorHandler) -> anyhow::Result<()> {
        let message = handler
            .primary_error()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Scrape failed".to_string());

        let failed = job.fail(message, handler.report())?;
        metrics::counter!("jobs_failed_total").increment(1);
        warn!(status = %failed.status, error = failed.error_message.as_deref().unwrap_or(""), "job failed");

        self.jobs.update(&failed).await?;
        self.refresh_batch(&failed).await?;
        Ok(())
    }

    /// 成员任务到达终态后重算所属批次
    ///
    /// 成员读取由批次仓库在刷新锁内完成，报告用同一份
    /// 快照生成。批次首次到达终态时保存报告。
    async fn refresh_batch(&self, job: &ScrapeJob) -> anyhow::Result<()> {
        let Some(batch_id) = job.batch_id else {
            return Ok(());
        };

        let (batch, members) = self
            .batches
            .recompute(batch_id, self.jobs.as_ref())
            .await?;

        if batch.status.is_terminal() && batch.report.is_none() {
            let report = BatchReport::generate(&batch, &members);
            self.batches
                .store_report(batch_id, serde_json::to_value(&report)?)
                .await?;
            info!(
                batch = %batch_id,
                status = %batch.status,
                success_rate = batch.success_rate(),
                "batch finished"
            );
        }
        Ok(())
    }
}
