// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use extractrs::application::dto::submit_request::SubmitBatchRequest;
use extractrs::application::use_cases::submit_job::SubmitBatchUseCase;
use extractrs::config::Settings;
use extractrs::domain::repositories::batch_repository::BatchRepository;
use extractrs::domain::services::extraction_service::{ExtractionConfig, ExtractionService};
use extractrs::domain::services::product_materializer::{MaterializerConfig, ProductMaterializer};
use extractrs::engines::browser_engine::BrowserEngine;
use extractrs::engines::circuit_breaker::CircuitConfig;
use extractrs::engines::fetcher::{Fetcher, FetcherConfig};
use extractrs::engines::http_engine::HttpEngine;
use extractrs::engines::traits::FetchEngine;
use extractrs::infrastructure::repositories::memory::{
    InMemoryBatchRepository, InMemoryJobRepository, InMemoryProductRepository,
};
use extractrs::queue::job_queue::RepositoryJobQueue;
use extractrs::utils::retry_policy::RetryPolicy;
use extractrs::utils::telemetry::init_telemetry;
use extractrs::workers::manager::WorkerManager;
use extractrs::workers::scrape_worker::ScrapeWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("Usage: extractrs <product-url> [more-urls...]");
        std::process::exit(2);
    }

    let settings = Settings::new()?;

    let jobs = Arc::new(InMemoryJobRepository::new());
    let batches = Arc::new(InMemoryBatchRepository::new());
    let products = Arc::new(InMemoryProductRepository::new());
    let queue = Arc::new(RepositoryJobQueue::new(jobs.clone()));

    let fetcher_config = FetcherConfig {
        timeout: Duration::from_secs(settings.fetch.timeout_secs),
        use_proxy: settings.fetch.use_proxy,
        min_content_length: settings.fetch.min_content_length,
        browser_fallback: settings.fetch.browser_fallback,
        circuit: CircuitConfig {
            failure_threshold: settings.fetch.circuit_failure_threshold,
            recovery_timeout: Duration::from_secs(settings.fetch.circuit_recovery_secs),
        },
        accept_language: settings.fetch.accept_language.clone(),
    };
    let policy = RetryPolicy {
        max_attempts: settings.retry.max_attempts,
        initial_backoff: Duration::from_millis(settings.retry.initial_backoff_ms),
        max_backoff: Duration::from_millis(settings.retry.max_backoff_ms),
        backoff_multiplier: settings.retry.backoff_multiplier,
        jitter_factor: settings.retry.jitter_factor,
        enable_jitter: true,
    };

    let browser_engine: Option<Arc<dyn FetchEngine>> = settings
        .fetch
        .browser_fallback
        .then(|| Arc::new(BrowserEngine) as Arc<dyn FetchEngine>);
    let fetcher = Arc::new(Fetcher::new(
        Arc::new(HttpEngine),
        browser_engine,
        fetcher_config,
        policy,
    ));

    let extraction = Arc::new(ExtractionService::new(ExtractionConfig::from(
        &settings.extraction,
    )));
    let materializer = Arc::new(ProductMaterializer::new(
        products.clone(),
        MaterializerConfig {
            slug_max_attempts: settings.materializer.slug_max_attempts,
            image_timeout: Duration::from_secs(settings.materializer.image_timeout_secs),
        },
    ));

    let submit = SubmitBatchUseCase::new(queue.clone(), jobs.clone(), batches.clone());
    let (batch, submitted) = submit
        .execute(SubmitBatchRequest {
            name: Some("cli".to_string()),
            vendor_id: Uuid::new_v4(),
            supplier_id: None,
            urls,
        })
        .await?;
    info!(batch = %batch.id, jobs = submitted.len(), "batch submitted, starting workers");

    let mut manager = WorkerManager::new();
    for _ in 0..settings.worker.count {
        manager.spawn(ScrapeWorker::new(
            queue.clone(),
            jobs.clone(),
            batches.clone(),
            fetcher.clone(),
            extraction.clone(),
            materializer.clone(),
            settings.materializer.auto_materialize,
        ));
    }

    // Poll until the batch report is stored, then stop the workers
    let final_batch = loop {
        sleep(Duration::from_millis(500)).await;
        let Some(current) = batches.find_by_id(batch.id).await? else {
            anyhow::bail!("batch record disappeared");
        };
        if current.status.is_terminal() && current.report.is_some() {
            break current;
        }
    };
    manager.abort();

    let report = final_batch.report.unwrap_or(serde_json::Value::Null);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
