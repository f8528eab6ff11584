// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::support;
use extractrs::application::dto::batch_report::BatchReport;
use extractrs::application::dto::submit_request::SubmitBatchRequest;
use extractrs::application::use_cases::submit_job::SubmitBatchUseCase;
use extractrs::domain::models::scrape_batch::BatchStatus;
use extractrs::domain::repositories::batch_repository::BatchRepository;
use extractrs::domain::services::extraction_service::{ExtractionConfig, ExtractionService};
use extractrs::domain::services::product_materializer::{MaterializerConfig, ProductMaterializer};
use extractrs::infrastructure::repositories::memory::{
    InMemoryBatchRepository, InMemoryJobRepository, InMemoryProductRepository,
};
use extractrs::queue::job_queue::RepositoryJobQueue;
use extractrs::workers::manager::WorkerManager;
use extractrs::workers::scrape_worker::ScrapeWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_batch_statistics_and_report() {
    let server = MockServer::start().await;

    for p in ["/p/1", "/p/2"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                support::product_page("Widget", "19.99", "/img/1.jpg"),
                "text/html; charset=utf-8",
            ))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/p/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let jobs = Arc::new(InMemoryJobRepository::new());
    let batches = Arc::new(InMemoryBatchRepository::new());
    let products = Arc::new(InMemoryProductRepository::new());
    let queue = Arc::new(RepositoryJobQueue::new(jobs.clone()));

    let mut manager = WorkerManager::new();
    for _ in 0..2 {
        manager.spawn(ScrapeWorker::new(
            queue.clone(),
            jobs.clone(),
            batches.clone(),
            support::test_fetcher(),
            Arc::new(ExtractionService::new(ExtractionConfig::default())),
            Arc::new(ProductMaterializer::new(
                products.clone(),
                MaterializerConfig::default(),
            )),
            // materialization is covered elsewhere, keep this batch lean
            false,
        ));
    }
    assert_eq!(manager.count(), 2);

    let submit = SubmitBatchUseCase::new(queue.clone(), jobs.clone(), batches.clone());
    let (batch, submitted) = submit
        .execute(SubmitBatchRequest {
            name: Some("import".to_string()),
            vendor_id: Uuid::new_v4(),
            supplier_id: None,
            urls: vec![
                format!("{}/p/1", server.uri()),
                format!("{}/p/2", server.uri()),
                format!("{}/p/gone", server.uri()),
            ],
        })
        .await
        .unwrap();
    assert_eq!(submitted.len(), 3);
    assert_eq!(batch.status, BatchStatus::Processing);

    let finished = timeout(Duration::from_secs(15), async {
        loop {
            let current = batches.find_by_id(batch.id).await.unwrap().unwrap();
            if current.status.is_terminal() && current.report.is_some() {
                return current;
            }
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("batch did not finish in time");
    manager.abort();

    assert_eq!(finished.status, BatchStatus::CompletedWithErrors);
    assert_eq!(finished.total, 3);
    assert_eq!(finished.completed, 2);
    assert_eq!(finished.failed, 1);
    assert_eq!(finished.success_rate(), 66.7);
    assert!(finished.completed_at.is_some());

    let report: BatchReport = serde_json::from_value(finished.report.unwrap()).unwrap();
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.success_rate, 66.7);
    assert_eq!(report.failed_jobs.len(), 1);
    assert!(report.failed_jobs[0].url.ends_with("/p/gone"));
    assert!(report.failed_jobs[0].error.is_some());
    assert_eq!(
        report.successful_jobs.len() + report.warning_jobs.len(),
        2
    );
}
