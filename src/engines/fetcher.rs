// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::circuit_breaker::{CircuitBreaker, CircuitConfig};
use crate::engines::traits::{FetchEngine, FetchRequest};
use crate::engines::validators;
use crate::utils::errors::{ErrorCategory, ErrorHandler, ScraperError};
use crate::utils::retry_policy::RetryPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use url::Url;

/// 每次尝试轮换的User-Agent池
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

/// 抓取器配置
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// 单次尝试超时
    pub timeout: Duration,
    /// 是否使用系统代理（默认绕过）
    pub use_proxy: bool,
    /// 响应体最小长度
    pub min_content_length: usize,
    /// 是否启用浏览器回退
    pub browser_fallback: bool,
    /// 熔断器配置
    pub circuit: CircuitConfig,
    /// Accept-Language头
    pub accept_language: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            use_proxy: false,
            min_content_length: 500,
            browser_fallback: true,
            circuit: CircuitConfig::default(),
            accept_language: "fa-IR,fa;q=0.9,en-US;q=0.7,en;q=0.5".to_string(),
        }
    }
}

/// 抓取成功得到的文档
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// 页面HTML
    pub html: String,
    /// 重定向后的最终URL
    pub final_url: Url,
    /// HTTP状态码
    pub status_code: u16,
}

/// 抓取器
///
/// 组合静态引擎、重试策略、会话级熔断器与浏览器回退，
/// 对外提供单一的`fetch(url)`契约。校验不通过的响应
/// 会映射为具体错误分类，不会静默流入解析。
pub struct Fetcher {
    static_engine: Arc<dyn FetchEngine>,
    browser_engine: Option<Arc<dyn FetchEngine>>,
    config: FetcherConfig,
    policy: RetryPolicy,
}

impl Fetcher {
    /// 创建新的抓取器实例
    pub fn new(
        static_engine: Arc<dyn FetchEngine>,
        browser_engine: Option<Arc<dyn FetchEngine>>,
        config: FetcherConfig,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            static_engine,
            browser_engine,
            config,
            policy,
        }
    }

    /// 抓取一个商品页URL
    ///
    /// 重试序列整体包在会话级熔断器里；SSL验证失败
    /// 恰好获得一次关闭验证的重试并记录MEDIUM警告；
    /// 静态路径失败后浏览器回退恰好尝试一次；
    /// 最终失败时返回捕获到的最具体错误。
    pub async fn fetch(
        &self,
        url: &str,
        handler: &mut ErrorHandler,
    ) -> Result<FetchedDocument, ScraperError> {
        let mut breaker = CircuitBreaker::new(self.config.circuit.clone());
        let mut skip_tls = false;
        let mut ssl_fallback_used = false;
        let mut needs_js_fallback = false;
        let mut attempt: u32 = 0;
        let mut last_error: Option<ScraperError> = None;

        loop {
            attempt += 1;

            if !breaker.is_call_permitted() {
                last_error = Some(ScraperError::network(
                    "Circuit breaker open, failing fast without a network call",
                    Some(format!(
                        "{} consecutive failures this session",
                        breaker.failure_count()
                    )),
                ));
                break;
            }

            let request = self.build_request(url, attempt, skip_tls, false);

            match self.static_engine.fetch(&request).await {
                Ok(response) => {
                    if RetryPolicy::is_retryable_status(response.status_code) {
                        breaker.record_failure();
                        last_error = Some(ScraperError::http_error(
                            response.status_code,
                            format!("Server responded with HTTP {}", response.status_code),
                        ));
                        if self.policy.has_attempts_left(attempt) {
                            let backoff = self.policy.calculate_backoff(attempt);
                            info!(attempt, status = response.status_code, "retryable status, backing off {:?}", backoff);
                            sleep(backoff).await;
                            continue;
                        }
                        break;
                    }

                    if response.status_code == 401 || response.status_code == 403 {
                        breaker.record_failure();
                        last_error = Some(ScraperError::permission(
                            format!("Access denied with HTTP {}", response.status_code),
                            Some(format!("url: {}", url)),
                        ));
                        break;
                    }

                    if response.status_code >= 400 {
                        breaker.record_failure();
                        last_error = Some(ScraperError::http_error(
                            response.status_code,
                            format!("Request failed with HTTP {}", response.status_code),
                        ));
                        break;
                    }

                    if let Err(e) =
                        validators::validate_response(&response, self.config.min_content_length)
                    {
                        breaker.record_failure();
                        let retryable = e.retry_recommended;
                        last_error = Some(e);
                        // Maintenance pages and other transient validation
                        // failures re-enter the retry sequence
                        if retryable && self.policy.has_attempts_left(attempt) {
                            let backoff = self.policy.calculate_backoff(attempt);
                            info!(attempt, "transient page served, backing off {:?}", backoff);
                            sleep(backoff).await;
                            continue;
                        }
                        break;
                    }

                    if !validators::validate_structure(&response.content) {
                        breaker.record_failure();
                        last_error = Some(ScraperError::parsing(
                            "Document failed structural validation, likely script-rendered",
                            Some(format!("url: {}", url)),
                        ));
                        needs_js_fallback = true;
                        break;
                    }

                    breaker.record_success();
                    return self.into_document(response);
                }
                Err(e) => {
                    breaker.record_failure();

                    if e.is_certificate_error() && !ssl_fallback_used {
                        // Exactly one automatic retry without verification,
                        // surfaced as a warning, never silent.
                        ssl_fallback_used = true;
                        skip_tls = true;
                        warn!(url, "SSL verification failed, retrying once without verification");
                        handler.add_warning(ScraperError::ssl_certificate(
                            "SSL verification failed; content fetched without certificate verification",
                            Some(e.to_string()),
                        ));
                        continue;
                    }

                    let retryable = e.is_retryable();
                    last_error = Some(map_engine_error(&e));

                    if retryable && self.policy.has_attempts_left(attempt) {
                        let backoff = self.policy.calculate_backoff(attempt);
                        info!(attempt, "transport error, backing off {:?}: {}", backoff, e);
                        sleep(backoff).await;
                        continue;
                    }
                    break;
                }
            }
        }

        // Static path exhausted; one browser-rendering fallback for
        // transport failures and script-rendered shells.
        if self.should_try_browser(&last_error, needs_js_fallback) {
            if let Some(result) = self.browser_fallback(url, skip_tls, handler).await {
                return Ok(result);
            }
        }

        let error = last_error.unwrap_or_else(|| {
            ScraperError::unknown("Fetch failed without a captured error", None)
        });
        handler.add_error(error.clone());
        Err(error)
    }

    fn build_request(&self, url: &str, attempt: u32, skip_tls: bool, needs_js: bool) -> FetchRequest {
        FetchRequest {
            url: url.to_string(),
            headers: HashMap::new(),
            user_agent: USER_AGENTS[(attempt as usize - 1) % USER_AGENTS.len()].to_string(),
            accept_language: self.config.accept_language.clone(),
            timeout: self.config.timeout,
            use_proxy: self.config.use_proxy,
            skip_tls_verification: skip_tls,
            needs_js,
        }
    }

    fn should_try_browser(&self, last_error: &Option<ScraperError>, needs_js_fallback: bool) -> bool {
        if !self.config.browser_fallback || self.browser_engine.is_none() {
            return false;
        }
        if needs_js_fallback {
            return true;
        }
        // Rendering cannot fix login walls or JSON endpoints
        matches!(
            last_error.as_ref().map(|e| e.category),
            Some(ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::HttpError)
        )
    }

    async fn browser_fallback(
        &self,
        url: &str,
        skip_tls: bool,
        handler: &mut ErrorHandler,
    ) -> Option<FetchedDocument> {
        let browser = self.browser_engine.as_ref()?;
        info!(url, "static fetch failed, attempting browser fallback");

        let request = self.build_request(url, 1, skip_tls, true);
        match browser.fetch(&request).await {
            Ok(response) => {
                let valid = validators::validate_response(&response, self.config.min_content_length)
                    .is_ok()
                    && validators::validate_structure(&response.content);
                if valid {
                    handler.add_warning(
                        ScraperError::parsing(
                            "Content obtained via browser rendering after static fetch failed",
                            None,
                        )
                        .as_warning(),
                    );
                    return self.into_document(response).ok();
                }
                warn!(url, "browser fallback returned an invalid document");
                None
            }
            Err(e) => {
                warn!(url, "browser fallback failed: {}", e);
                None
            }
        }
    }

    fn into_document(
        &self,
        response: crate::engines::traits::FetchResponse,
    ) -> Result<FetchedDocument, ScraperError> {
        let final_url = Url::parse(&response.final_url).map_err(|e| {
            ScraperError::parsing(
                "Response carried an unparseable final URL",
                Some(e.to_string()),
            )
        })?;

        Ok(FetchedDocument {
            html: response.content,
            final_url,
            status_code: response.status_code,
        })
    }
}

/// 将引擎层错误映射到抓取错误分类
fn map_engine_error(e: &crate::engines::traits::EngineError) -> ScraperError {
    if e.is_timeout() {
        ScraperError::timeout("Request timed out", Some(e.to_string()))
    } else if e.is_certificate_error() {
        let mut error = ScraperError::ssl_certificate(
            "SSL certificate verification failed",
            Some(e.to_string()),
        );
        error.severity = crate::utils::errors::Severity::High;
        error
    } else {
        ScraperError::network("Connection failed", Some(e.to_string()))
    }
}
