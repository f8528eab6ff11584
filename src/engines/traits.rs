// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 浏览器引擎错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::Timeout => true,
            EngineError::Browser(_) => false,
            EngineError::Other(_) => false,
        }
    }

    /// 判断是否为证书校验错误
    ///
    /// reqwest不直接暴露TLS错误类型，沿错误链检查描述文本。
    pub fn is_certificate_error(&self) -> bool {
        let EngineError::RequestFailed(e) = self else {
            return false;
        };

        let mut text = e.to_string().to_lowercase();
        let mut source = e.source();
        while let Some(inner) = source {
            text.push(' ');
            text.push_str(&inner.to_string().to_lowercase());
            source = inner.source();
        }

        text.contains("certificate") || text.contains("self signed") || text.contains("tls")
    }

    /// 判断是否为超时错误
    pub fn is_timeout(&self) -> bool {
        match self {
            EngineError::Timeout => true,
            EngineError::RequestFailed(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 请求头
    pub headers: HashMap<String, String>,
    /// 本次尝试使用的User-Agent
    pub user_agent: String,
    /// Accept-Language头（偏向目标地区语言）
    pub accept_language: String,
    /// 超时时间
    pub timeout: Duration,
    /// 是否使用系统代理（默认绕过）
    pub use_proxy: bool,
    /// 是否跳过TLS验证
    pub skip_tls_verification: bool,
    /// 是否需要JavaScript渲染
    pub needs_js: bool,
}

impl FetchRequest {
    /// 构建针对单个URL的默认请求
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            user_agent: String::new(),
            accept_language: "fa-IR,fa;q=0.9,en-US;q=0.7,en;q=0.5".to_string(),
            timeout: Duration::from_secs(30),
            use_proxy: false,
            skip_tls_verification: false,
            needs_js: false,
        }
    }
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 解码后的响应内容
    pub content: String,
    /// 内容类型
    pub content_type: String,
    /// 响应头
    pub headers: HashMap<String, String>,
    /// 重定向后的最终URL
    pub final_url: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 抓取引擎特质
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// 执行抓取
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
