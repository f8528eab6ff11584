// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

// Global browser instance to avoid re-launching Chrome on every request.
static BROWSER_INSTANCE: OnceCell<Browser> = OnceCell::const_new();

// Asynchronously gets or initializes the shared browser instance.
async fn get_browser() -> Result<&'static Browser, EngineError> {
    BROWSER_INSTANCE
        .get_or_try_init(|| async {
            let remote_debugging_url = std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok();

            let (browser, mut handler) = if let Some(ref url) = remote_debugging_url {
                tracing::info!("Connecting to remote Chrome instance at: {}", url);
                Browser::connect(url).await.map_err(|e| {
                    EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e))
                })?
            } else {
                let mut builder = BrowserConfig::builder()
                    .no_sandbox()
                    .request_timeout(Duration::from_secs(30));

                builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

                Browser::launch(
                    builder
                        .build()
                        .map_err(|e| EngineError::Browser(e.to_string()))?,
                )
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?
            };

            // Spawn a handler to process browser events
            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        })
        .await
}

/// 浏览器回退引擎
///
/// 基于chromiumoxide的渲染引擎，仅作为静态抓取失败或
/// 页面结构校验不通过时的一次性回退，不是主路径。
pub struct BrowserEngine;

#[async_trait]
impl FetchEngine for BrowserEngine {
    /// 用无头浏览器渲染并抓取页面
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        if !request.needs_js {
            return Err(EngineError::Other(
                "BrowserEngine only serves JS-rendered fallback requests".to_string(),
            ));
        }

        let start = Instant::now();

        tokio::time::timeout(request.timeout, async {
            let browser = get_browser().await?;

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;

            page.set_user_agent(request.user_agent.as_str())
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;

            // goto waits for the load event by default
            page.goto(&request.url)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;

            let content = page
                .content()
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;

            let final_url = page
                .url()
                .await
                .ok()
                .flatten()
                .unwrap_or_else(|| request.url.clone());

            let _ = page.close().await;

            Ok(FetchResponse {
                // CDP does not surface the navigation status here; a rendered
                // document implies the navigation itself succeeded.
                status_code: 200,
                content,
                content_type: "text/html".to_string(),
                headers: std::collections::HashMap::new(),
                final_url,
                response_time_ms: start.elapsed().as_millis() as u64,
            })
        })
        .await
        .map_err(|_| EngineError::Timeout)?
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "browser"
    }
}
