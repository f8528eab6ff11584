// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::FetchResponse;
use crate::utils::errors::ScraperError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// 登录墙特征（英语与波斯语）
static LOGIN_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(sign in to continue|log ?in to continue|please log ?in|ورود به حساب کاربری|برای مشاهده وارد شوید|رمز عبور خود را وارد)"#,
    )
    .expect("login pattern regex")
});

/// 维护模式特征
static MAINTENANCE_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(under maintenance|scheduled maintenance|be back soon|در حال بروزرسانی|در دست تعمیر|به زودی باز می گردیم)"#,
    )
    .expect("maintenance pattern regex")
});

/// 通用错误页特征
static ERROR_PAGE_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(page not found|404 error|no longer available|صفحه مورد نظر یافت نشد|صفحه ای که به دنبال آن هستید|محصول یافت نشد)"#,
    )
    .expect("error page pattern regex")
});

/// 反爬拦截特征
static ANTI_BOT_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(cloudflare|just a moment|checking your browser|access denied|captcha|ddos protection|are you a robot)"#,
    )
    .expect("anti-bot pattern regex")
});

/// 校验原始响应是否值得送入解析
///
/// JSON响应、过短的响应体、登录墙、维护页、错误页和
/// 反爬拦截页都在这里拦下并映射为具体错误分类，
/// 绝不静默当作商品页内容解析。
pub fn validate_response(
    response: &FetchResponse,
    min_content_length: usize,
) -> Result<(), ScraperError> {
    if response.content_type.starts_with("application/json") {
        return Err(ScraperError::parsing(
            "URL returned JSON instead of an HTML product page",
            Some(format!("content-type: {}", response.content_type)),
        ));
    }

    if response.content.len() < min_content_length {
        return Err(ScraperError::http_error(
            response.status_code,
            format!(
                "Response body too short to be a product page ({} bytes)",
                response.content.len()
            ),
        ));
    }

    // Pattern checks run against a bounded prefix; block pages are short
    let probe: String = response.content.chars().take(20_000).collect();

    if ANTI_BOT_PATTERNS.is_match(&probe) {
        return Err(ScraperError::permission(
            "Anti-bot protection page detected",
            Some("anti-bot challenge markers found in response body".to_string()),
        ));
    }

    if LOGIN_PATTERNS.is_match(&probe) || redirected_to_login(&response.final_url) {
        return Err(ScraperError::permission(
            "Page requires login to view",
            Some(format!("final URL: {}", response.final_url)),
        ));
    }

    if MAINTENANCE_PATTERNS.is_match(&probe) {
        let mut error =
            ScraperError::http_error(response.status_code, "Site is in maintenance mode");
        error.retry_recommended = true;
        return Err(error);
    }

    if ERROR_PAGE_PATTERNS.is_match(&probe) {
        return Err(ScraperError::http_error(
            response.status_code,
            "Generic error page served instead of a product page",
        ));
    }

    Ok(())
}

/// 判断最终URL是否被重定向到了登录页
fn redirected_to_login(final_url: &str) -> bool {
    let lowered = final_url.to_lowercase();
    ["/login", "/signin", "/sign-in", "/account/login", "/auth"]
        .iter()
        .any(|p| lowered.contains(p))
}

/// 结构校验：文档是否像一个可抽取的页面
///
/// 脚本渲染的空壳页面通不过此检查，触发浏览器引擎回退。
pub fn validate_structure(html: &str) -> bool {
    let document = Html::parse_document(html);

    let body_selector = Selector::parse("body").expect("body selector");
    let Some(body) = document.select(&body_selector).next() else {
        return false;
    };

    let element_count = body.descendants().filter(|n| n.value().is_element()).count();
    let text_len: usize = body.text().map(|t| t.trim().len()).sum();

    element_count >= 10 && text_len >= 200
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn response(content: &str, content_type: &str, final_url: &str) -> FetchResponse {
        FetchResponse {
            status_code: 200,
            content: content.to_string(),
            content_type: content_type.to_string(),
            headers: HashMap::new(),
            final_url: final_url.to_string(),
            response_time_ms: 10,
        }
    }

    fn long_html(marker: &str) -> String {
        format!(
            "<html><body><div>{}</div><p>{}</p></body></html>",
            marker,
            "x".repeat(600)
        )
    }

    #[test]
    fn test_rejects_json_response() {
        let resp = response(&"{}".repeat(300), "application/json", "http://shop.ir/p/1");
        let err = validate_response(&resp, 500).unwrap_err();
        assert_eq!(err.category, crate::utils::errors::ErrorCategory::Parsing);
    }

    #[test]
    fn test_rejects_short_body() {
        let resp = response("<html></html>", "text/html", "http://shop.ir/p/1");
        assert!(validate_response(&resp, 500).is_err());
    }

    #[test]
    fn test_detects_login_wall() {
        let resp = response(
            &long_html("ورود به حساب کاربری"),
            "text/html",
            "http://shop.ir/p/1",
        );
        let err = validate_response(&resp, 100).unwrap_err();
        assert_eq!(err.category, crate::utils::errors::ErrorCategory::Permission);
    }

    #[test]
    fn test_detects_login_redirect() {
        let resp = response(
            &long_html("welcome"),
            "text/html",
            "http://shop.ir/account/login?next=/p/1",
        );
        let err = validate_response(&resp, 100).unwrap_err();
        assert_eq!(err.category, crate::utils::errors::ErrorCategory::Permission);
    }

    #[test]
    fn test_detects_maintenance_page_as_retryable() {
        let resp = response(
            &long_html("در حال بروزرسانی هستیم"),
            "text/html",
            "http://shop.ir/p/1",
        );
        let err = validate_response(&resp, 100).unwrap_err();
        assert_eq!(err.category, crate::utils::errors::ErrorCategory::HttpError);
        assert!(err.retry_recommended);
    }

    #[test]
    fn test_detects_anti_bot_page() {
        let resp = response(
            &long_html("Checking your browser before accessing"),
            "text/html",
            "http://shop.ir/p/1",
        );
        let err = validate_response(&resp, 100).unwrap_err();
        assert_eq!(err.category, crate::utils::errors::ErrorCategory::Permission);
        assert!(!err.retry_recommended);
    }

    #[test]
    fn test_accepts_normal_product_page() {
        let resp = response(&long_html("گوشی موبایل"), "text/html", "http://shop.ir/p/1");
        assert!(validate_response(&resp, 100).is_ok());
    }

    #[test]
    fn test_structure_validation() {
        let rich: String = (0..20)
            .map(|i| format!("<div><p>paragraph number {} with some real text</p></div>", i))
            .collect();
        assert!(validate_structure(&format!("<html><body>{}</body></html>", rich)));

        // Script-rendered shell
        assert!(!validate_structure(
            "<html><body><div id=\"app\"></div><script src=\"a.js\"></script></body></html>"
        ));
    }
}
