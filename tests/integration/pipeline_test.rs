// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::support;
use extractrs::application::dto::job_view::JobView;
use extractrs::application::dto::submit_request::SubmitJobRequest;
use extractrs::application::use_cases::submit_job::SubmitJobUseCase;
use extractrs::domain::models::scrape_job::JobStatus;
use extractrs::domain::repositories::job_repository::JobRepository;
use extractrs::domain::repositories::product_repository::ProductRepository;
use extractrs::domain::services::extraction_service::{ExtractionConfig, ExtractionService};
use extractrs::domain::services::product_materializer::{MaterializerConfig, ProductMaterializer};
use extractrs::infrastructure::repositories::memory::{
    InMemoryBatchRepository, InMemoryJobRepository, InMemoryProductRepository,
};
use extractrs::queue::job_queue::RepositoryJobQueue;
use extractrs::workers::scrape_worker::ScrapeWorker;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_pipeline_creates_product_draft() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/42"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            support::product_page("Widget", "19.99", "/img/1.jpg"),
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/1.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0xFFu8, 0xD8, 0xFF, 0xE0], "image/jpeg"),
        )
        .mount(&server)
        .await;

    let jobs = Arc::new(InMemoryJobRepository::new());
    let batches = Arc::new(InMemoryBatchRepository::new());
    let products = Arc::new(InMemoryProductRepository::new());
    let queue = Arc::new(RepositoryJobQueue::new(jobs.clone()));

    let worker = ScrapeWorker::new(
        queue.clone(),
        jobs.clone(),
        batches.clone(),
        support::test_fetcher(),
        Arc::new(ExtractionService::new(ExtractionConfig::default())),
        Arc::new(ProductMaterializer::new(
            products.clone(),
            MaterializerConfig::default(),
        )),
        true,
    );
    let worker_handle = tokio::spawn(worker.run());

    let submit = SubmitJobUseCase::new(queue.clone());
    let job = submit
        .execute(SubmitJobRequest {
            url: format!("{}/p/42", server.uri()),
            vendor_id: Uuid::new_v4(),
            supplier_id: None,
            batch_id: None,
        })
        .await
        .unwrap();

    let finished = timeout(Duration::from_secs(10), async {
        loop {
            if let Some(current) = jobs.find_by_id(job.id).await.unwrap() {
                if current.status.is_terminal() {
                    return current;
                }
            }
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("job did not reach a terminal state in time");
    worker_handle.abort();

    assert_eq!(finished.status, JobStatus::Completed);

    let data = finished.extracted_data.as_ref().unwrap();
    assert_eq!(data.name.as_deref(), Some("Widget"));
    assert_eq!(data.price, Some(Decimal::from_str("19.99").unwrap()));
    assert_eq!(data.meta.strategy_for("name"), Some("json_ld"));
    assert!(data.quality.percentage > 50.0);

    let product_id = finished.created_product_id.expect("product attached");
    let product = products.find_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.name, "Widget");
    assert!(product.slug.starts_with("widget-"));
    assert_eq!(product.price, Some(Decimal::from_str("19.99").unwrap()));
    assert_eq!(product.images.len(), 1);
    assert!(product.images[0].is_primary);

    let view = JobView::from(&finished);
    assert_eq!(view.status, "completed");
    assert_eq!(view.created_product_id, Some(product_id));
    assert_eq!(view.quality_percentage, Some(data.quality.percentage));
    assert!(view.processed_at.is_some());
    assert!(view.error_report.is_none());
    let viewed = view.extracted_data.expect("view carries the extraction");
    assert_eq!(viewed.name.as_deref(), Some("Widget"));
}

#[tokio::test]
async fn test_failed_image_download_degrades_to_warning() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/7"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            support::product_page("Gadget", "45000", "/img/missing.jpg"),
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;
    // The image URL 404s; the draft is still created without it
    Mock::given(method("GET"))
        .and(path("/img/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let jobs = Arc::new(InMemoryJobRepository::new());
    let batches = Arc::new(InMemoryBatchRepository::new());
    let products = Arc::new(InMemoryProductRepository::new());
    let queue = Arc::new(RepositoryJobQueue::new(jobs.clone()));

    let worker = ScrapeWorker::new(
        queue.clone(),
        jobs.clone(),
        batches,
        support::test_fetcher(),
        Arc::new(ExtractionService::new(ExtractionConfig::default())),
        Arc::new(ProductMaterializer::new(
            products.clone(),
            MaterializerConfig::default(),
        )),
        true,
    );
    let worker_handle = tokio::spawn(worker.run());

    let submit = SubmitJobUseCase::new(queue.clone());
    let job = submit
        .execute(SubmitJobRequest {
            url: format!("{}/p/7", server.uri()),
            vendor_id: Uuid::new_v4(),
            supplier_id: None,
            batch_id: None,
        })
        .await
        .unwrap();

    let finished = timeout(Duration::from_secs(10), async {
        loop {
            if let Some(current) = jobs.find_by_id(job.id).await.unwrap() {
                if current.status.is_terminal() {
                    return current;
                }
            }
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("job did not reach a terminal state in time");
    worker_handle.abort();

    assert_eq!(finished.status, JobStatus::CompletedWithWarnings);
    let report = finished.error_report.expect("warning report stored");
    assert!(report["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w["category"] == "IMAGE_DOWNLOAD"));

    let product_id = finished.created_product_id.expect("product attached");
    let product = products.find_by_id(product_id).await.unwrap().unwrap();
    assert!(product.images.is_empty());
}
