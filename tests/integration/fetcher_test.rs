// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::support;
use extractrs::utils::errors::{ErrorCategory, ErrorHandler};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UA_FIRST_ATTEMPT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const UA_SECOND_ATTEMPT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_retries_transient_status_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(html_response(support::product_page(
            "Widget",
            "19.99",
            "/img/1.jpg",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = support::test_fetcher();
    let mut handler = ErrorHandler::new();
    let document = fetcher
        .fetch(&format!("{}/p/1", server.uri()), &mut handler)
        .await
        .unwrap();

    assert_eq!(document.status_code, 200);
    assert!(document.html.contains("Widget"));
    assert!(!handler.has_errors());
}

#[tokio::test]
async fn test_user_agent_rotates_between_attempts() {
    let server = MockServer::start().await;

    // The first attempt carries the first pool entry and is told to retry;
    // the second attempt must arrive with a different user agent.
    Mock::given(method("GET"))
        .and(header("user-agent", UA_FIRST_ATTEMPT))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("user-agent", UA_SECOND_ATTEMPT))
        .respond_with(html_response(support::product_page(
            "Widget",
            "19.99",
            "/img/1.jpg",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = support::test_fetcher();
    let mut handler = ErrorHandler::new();
    let document = fetcher
        .fetch(&format!("{}/p/1", server.uri()), &mut handler)
        .await
        .unwrap();
    assert_eq!(document.status_code, 200);
}

#[tokio::test]
async fn test_maintenance_page_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    let maintenance = format!(
        "<html><body><h1>Under maintenance</h1><p>{}</p></body></html>",
        "we will be back shortly. ".repeat(10)
    );
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(maintenance, "text/html"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(html_response(support::product_page(
            "Widget",
            "19.99",
            "/img/1.jpg",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = support::test_fetcher();
    let mut handler = ErrorHandler::new();
    let document = fetcher
        .fetch(&format!("{}/p/1", server.uri()), &mut handler)
        .await
        .unwrap();
    assert_eq!(document.status_code, 200);
    assert!(document.html.contains("Widget"));
}

#[tokio::test]
async fn test_forbidden_is_permission_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = support::test_fetcher();
    let mut handler = ErrorHandler::new();
    let error = fetcher
        .fetch(&format!("{}/p/1", server.uri()), &mut handler)
        .await
        .unwrap_err();

    assert_eq!(error.category, ErrorCategory::Permission);
    assert!(!handler.should_retry());
}

#[tokio::test]
async fn test_json_endpoint_is_rejected_as_parsing_error() {
    let server = MockServer::start().await;
    let body = format!(r#"{{"data": "{}"}}"#, "x".repeat(600));
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = support::test_fetcher();
    let mut handler = ErrorHandler::new();
    let error = fetcher
        .fetch(&format!("{}/api/p/1", server.uri()), &mut handler)
        .await
        .unwrap_err();

    assert_eq!(error.category, ErrorCategory::Parsing);
}

#[tokio::test]
async fn test_anti_bot_page_maps_to_permission() {
    let server = MockServer::start().await;
    let body = format!(
        "<html><body><h1>Just a moment...</h1><p>{}</p></body></html>",
        "checking your browser before accessing. ".repeat(20)
    );
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = support::test_fetcher();
    let mut handler = ErrorHandler::new();
    let error = fetcher
        .fetch(&format!("{}/p/1", server.uri()), &mut handler)
        .await
        .unwrap_err();

    assert_eq!(error.category, ErrorCategory::Permission);
}

#[tokio::test]
async fn test_not_found_fails_without_exhausting_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = support::test_fetcher();
    let mut handler = ErrorHandler::new();
    let error = fetcher
        .fetch(&format!("{}/p/gone", server.uri()), &mut handler)
        .await
        .unwrap_err();

    assert_eq!(error.category, ErrorCategory::HttpError);
    assert!(!error.retry_recommended);
}
