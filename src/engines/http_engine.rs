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

use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Instant;

/// HTTP抓取引擎
///
/// 基于reqwest的静态抓取引擎，负责代理绕过、TLS开关
/// 和响应体的字符集探测解码。
pub struct HttpEngine;

#[async_trait]
impl FetchEngine for HttpEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 抓取响应
    /// * `Err(EngineError)` - 抓取过程中出现的错误
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        // Build headers
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&request.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, v);
        }
        for (k, v) in &request.headers {
            if let (Ok(k), Ok(v)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                headers.insert(k, v);
            }
        }

        // Each request gets a fresh client for cookie isolation
        let mut builder = reqwest::Client::builder()
            .user_agent(request.user_agent.as_str())
            .timeout(request.timeout)
            .cookie_store(true);

        // System proxy is bypassed unless explicitly requested
        if !request.use_proxy {
            builder = builder.no_proxy();
        }

        if request.skip_tls_verification {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build()?;

        let start = Instant::now();
        let response = client.get(&request.url).headers(headers).send().await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        let content_type = if content_type.trim().is_empty() {
            "text/html".to_string()
        } else {
            content_type
        };

        let mut response_headers = std::collections::HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                response_headers.insert(k.as_str().to_string(), v_str.to_string());
            }
        }

        // Persian shops routinely mislabel their charset; decode from raw
        // bytes with header hint first, sniffing as a fallback.
        let body = response.bytes().await?;
        let content = decode_body(&body, &content_type);

        Ok(FetchResponse {
            status_code,
            content,
            content_type,
            headers: response_headers,
            final_url,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "http"
    }
}

/// 将原始响应字节解码为字符串
///
/// 优先使用content-type中的charset标签，
/// 缺失或未知时用chardetng做统计探测。
fn decode_body(bytes: &[u8], content_type: &str) -> String {
    let labeled = content_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset="))
        .next()
        .and_then(|label| encoding_rs::Encoding::for_label(label.trim_matches('"').as_bytes()));

    let encoding = labeled.unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, true);
        detector.guess(None, true)
    });

    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_label() {
        let text = "گوشی موبایل";
        let decoded = decode_body(text.as_bytes(), "text/html; charset=utf-8");
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_decode_windows_1256_with_label() {
        // "سلام" in windows-1256
        let bytes = [0xD3, 0xE1, 0xC7, 0xE3];
        let decoded = decode_body(&bytes, "text/html; charset=windows-1256");
        assert_eq!(decoded, "سلام");
    }

    #[test]
    fn test_decode_sniffs_when_unlabeled() {
        let text = "قیمت محصول ۱۲۵۰۰ تومان";
        let decoded = decode_body(text.as_bytes(), "text/html");
        assert_eq!(decoded, text);
    }
}
