// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 抓取错误分类
///
/// 对一次抓取尝试中可能出现的故障进行归类，
/// 每个分类携带默认的严重级别与重试建议。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// 网络错误（连接失败、DNS等）
    Network,
    /// SSL证书错误
    SslCertificate,
    /// HTTP状态码错误
    HttpError,
    /// 页面解析错误
    Parsing,
    /// 数据校验错误
    DataValidation,
    /// 图片下载错误
    ImageDownload,
    /// 数据库错误
    Database,
    /// 超时错误
    Timeout,
    /// 权限/反爬拦截错误
    Permission,
    /// 未知错误
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ErrorCategory::Network => "NETWORK",
            ErrorCategory::SslCertificate => "SSL_CERTIFICATE",
            ErrorCategory::HttpError => "HTTP_ERROR",
            ErrorCategory::Parsing => "PARSING",
            ErrorCategory::DataValidation => "DATA_VALIDATION",
            ErrorCategory::ImageDownload => "IMAGE_DOWNLOAD",
            ErrorCategory::Database => "DATABASE",
            ErrorCategory::Timeout => "TIMEOUT",
            ErrorCategory::Permission => "PERMISSION",
            ErrorCategory::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// 错误严重级别
///
/// 级别可比较，CRITICAL最高。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// 低（不影响结果使用）
    Low,
    /// 中（结果降级但可用）
    Medium,
    /// 高（本次尝试失败）
    High,
    /// 致命（不应自动重试）
    Critical,
}

/// 抓取错误记录
///
/// 不可变的结构化错误，携带分类、级别、
/// 可恢复与重试标记以及给运维人员的修复建议。
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("[{category}] {message}")]
pub struct ScraperError {
    /// 错误分类
    pub category: ErrorCategory,
    /// 严重级别
    pub severity: Severity,
    /// 人类可读的错误信息
    pub message: String,
    /// 错误细节（原始错误文本、状态码等）
    pub details: Option<String>,
    /// 是否可在本任务内恢复（降级继续）
    pub recoverable: bool,
    /// 是否建议自动重试
    pub retry_recommended: bool,
    /// 修复建议
    pub remediation: String,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
}

impl ScraperError {
    #[allow(clippy::too_many_arguments)]
    fn build(
        category: ErrorCategory,
        severity: Severity,
        message: impl Into<String>,
        details: Option<String>,
        recoverable: bool,
        retry_recommended: bool,
        remediation: &str,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            details,
            recoverable,
            retry_recommended,
            remediation: remediation.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// 网络层错误（连接失败、DNS解析失败等）
    pub fn network(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::Network,
            Severity::High,
            message,
            details,
            false,
            true,
            "Check the target site availability and local network, then retry",
        )
    }

    /// SSL证书错误
    pub fn ssl_certificate(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::SslCertificate,
            Severity::Medium,
            message,
            details,
            true,
            true,
            "The certificate chain is broken on the target site; content was fetched without verification",
        )
    }

    /// HTTP状态码错误
    pub fn http_error(status: u16, message: impl Into<String>) -> Self {
        // 5xx and 429 are transient by convention, other 4xx are not
        let retry = status == 429 || (500..=599).contains(&status);
        Self::build(
            ErrorCategory::HttpError,
            Severity::High,
            message,
            Some(format!("HTTP status {}", status)),
            false,
            retry,
            "Verify the URL opens in a browser; the server may be rate limiting or down",
        )
    }

    /// 页面解析错误
    pub fn parsing(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::Parsing,
            Severity::High,
            message,
            details,
            false,
            false,
            "The page structure is not a recognizable product page; check the URL points at a single product",
        )
    }

    /// 数据校验错误（字段级，可降级）
    pub fn data_validation(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::DataValidation,
            Severity::Medium,
            message,
            details,
            true,
            false,
            "Review the extracted draft and fill the missing fields manually",
        )
    }

    /// 图片下载错误（单张图片失败不致命）
    pub fn image_download(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::ImageDownload,
            Severity::Low,
            message,
            details,
            true,
            false,
            "Upload the product images manually if the draft is missing them",
        )
    }

    /// 数据库错误（致命，不自动重试）
    pub fn database(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::Database,
            Severity::Critical,
            message,
            details,
            false,
            false,
            "Inspect application logs and database health before retrying manually",
        )
    }

    /// 超时错误
    pub fn timeout(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::Timeout,
            Severity::High,
            message,
            details,
            false,
            true,
            "The site is slow or unreachable; retry later or increase the fetch timeout",
        )
    }

    /// 权限/反爬错误（登录墙、验证码、封禁）
    pub fn permission(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::Permission,
            Severity::High,
            message,
            details,
            false,
            false,
            "The site blocks automated access or requires login; this URL cannot be scraped automatically",
        )
    }

    /// 未知错误
    pub fn unknown(message: impl Into<String>, details: Option<String>) -> Self {
        Self::build(
            ErrorCategory::Unknown,
            Severity::High,
            message,
            details,
            false,
            false,
            "Inspect application logs for the underlying cause",
        )
    }

    /// 降级为警告级别的副本
    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Low;
        self.recoverable = true;
        self
    }
}

/// 单次任务尝试的错误累加器
///
/// 收集致命错误与非致命警告，从不panic。
/// 作为显式上下文随抓取流程传递，而不是挂在服务实例上。
#[derive(Debug, Default, Clone)]
pub struct ErrorHandler {
    errors: Vec<ScraperError>,
    warnings: Vec<ScraperError>,
}

impl ErrorHandler {
    /// 创建新的错误累加器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个错误
    pub fn add_error(&mut self, error: ScraperError) {
        tracing::debug!(category = %error.category, severity = ?error.severity, "scraper error: {}", error.message);
        self.errors.push(error);
    }

    /// 记录一个非致命警告
    pub fn add_warning(&mut self, warning: ScraperError) {
        tracing::debug!(category = %warning.category, "scraper warning: {}", warning.message);
        self.warnings.push(warning);
    }

    /// 是否存在高于等于HIGH级别的错误
    pub fn has_critical_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity >= Severity::High)
    }

    /// 是否记录过任何错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否记录过任何警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 所有警告
    pub fn warnings(&self) -> &[ScraperError] {
        &self.warnings
    }

    /// 所有错误
    pub fn errors(&self) -> &[ScraperError] {
        &self.errors
    }

    /// 最严重的错误
    ///
    /// 相同级别时保留先记录的一个。
    pub fn primary_error(&self) -> Option<&ScraperError> {
        self.errors.iter().fold(None, |best, e| match best {
            Some(b) if b.severity >= e.severity => Some(b),
            _ => Some(e),
        })
    }

    /// 根据主错误判断是否建议自动重试
    ///
    /// 没有错误时无需重试。
    pub fn should_retry(&self) -> bool {
        self.primary_error()
            .map(|e| e.retry_recommended)
            .unwrap_or(false)
    }

    /// 序列化为任务记录中保存的错误报告快照
    pub fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors,
            "warnings": self.warnings,
            "primary_error": self.primary_error(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_primary_error_most_severe_first_wins() {
        let mut handler = ErrorHandler::new();
        handler.add_error(ScraperError::data_validation("missing price", None));
        handler.add_error(ScraperError::network("connection refused", None));
        handler.add_error(ScraperError::timeout("read timed out", None));

        // network and timeout are both HIGH, network came first
        let primary = handler.primary_error().unwrap();
        assert_eq!(primary.category, ErrorCategory::Network);
    }

    #[test]
    fn test_should_retry_follows_primary() {
        let mut handler = ErrorHandler::new();
        handler.add_error(ScraperError::permission("login wall", None));
        assert!(!handler.should_retry());

        let mut handler = ErrorHandler::new();
        handler.add_error(ScraperError::timeout("read timed out", None));
        assert!(handler.should_retry());

        // no errors, nothing to retry
        assert!(!ErrorHandler::new().should_retry());
    }

    #[test]
    fn test_has_critical_errors_threshold() {
        let mut handler = ErrorHandler::new();
        handler.add_error(ScraperError::data_validation("short description", None));
        assert!(!handler.has_critical_errors());

        handler.add_error(ScraperError::database("insert failed", None));
        assert!(handler.has_critical_errors());
    }

    #[test]
    fn test_warnings_do_not_affect_retry() {
        let mut handler = ErrorHandler::new();
        handler.add_warning(ScraperError::image_download("one image failed", None));
        assert!(!handler.has_errors());
        assert!(handler.has_warnings());
        assert!(!handler.should_retry());
    }

    #[test]
    fn test_http_error_retry_statuses() {
        assert!(ScraperError::http_error(429, "too many requests").retry_recommended);
        assert!(ScraperError::http_error(503, "unavailable").retry_recommended);
        assert!(!ScraperError::http_error(404, "not found").retry_recommended);
        assert!(!ScraperError::http_error(403, "forbidden").retry_recommended);
    }
}
