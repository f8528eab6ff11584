// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ExtractionSettings;
use crate::domain::models::extracted::ExtractedProductData;
use crate::domain::models::platform::Platform;
use crate::domain::services::content_block::{self, ContentBlockConfig};
use crate::domain::services::selector_table::{self, SelectorTable};
use crate::domain::services::structured_data::{self, StructuredProduct};
use crate::domain::services::quality;
use crate::utils::errors::{ErrorHandler, ScraperError};
use crate::utils::price::parse_price;
use crate::utils::text_normalizer;
use crate::utils::url_utils;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// 与平台无关的通用名称选择器
///
/// 末尾几条覆盖波斯语站点常见的拉丁转写类名。
const GENERIC_NAME_SELECTORS: &[&str] = &[
    "h1[itemprop=name]",
    "[class*=product-title]",
    "[class*=product_title]",
    "[class*=product-name]",
    "[id*=product-name]",
    "[class*=mahsul] h1",
    "[class*=mahsool] h1",
];

/// 与平台无关的通用描述选择器
const GENERIC_DESCRIPTION_SELECTORS: &[&str] = &[
    "[itemprop=description]",
    "[class*=product-desc]",
    "[class*=product-description]",
    "[id*=product-description]",
    "#description",
    "[class*=tozihat]",
];

/// 与平台无关的通用价格选择器
const GENERIC_PRICE_SELECTORS: &[&str] = &[
    "[itemprop=price]",
    "[class*=product-price]",
    "[class*=price]",
    "[id*=price]",
    "[class*=qeymat]",
    "[class*=gheymat]",
    "[id*=gheymat]",
];

/// 与平台无关的通用图片选择器
const GENERIC_IMAGE_SELECTORS: &[&str] = &[
    "[class*=product-gallery] img",
    "[class*=product-image] img",
    "[class*=gallery] img",
    "[itemprop=image]",
];

/// 与平台无关的面包屑选择器
const GENERIC_BREADCRUMB_SELECTORS: &[&str] = &[
    "[class*=breadcrumb] a",
    "nav[aria-label=breadcrumb] a",
    "[itemprop=itemListElement] a",
];

/// 面包屑里要丢弃的首页标签
const HOME_LABELS: &[&str] = &["home", "خانه", "صفحه اصلی", "فروشگاه", "shop"];

/// 抽取配置
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// 价格上限（超过视为解析错误）
    pub max_price: Decimal,
    /// 商品图片数量上限
    pub max_images: usize,
    /// 兜底描述最小长度
    pub min_description_length: usize,
    /// 正文块链接密度阈值
    pub link_density_threshold: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_price: Decimal::from(10_000_000_000u64),
            max_images: 20,
            min_description_length: 150,
            link_density_threshold: 1.0,
        }
    }
}

impl From<&ExtractionSettings> for ExtractionConfig {
    fn from(settings: &ExtractionSettings) -> Self {
        Self {
            max_price: Decimal::from(settings.max_price),
            max_images: settings.max_images,
            min_description_length: settings.min_description_length,
            link_density_threshold: settings.link_density_threshold,
        }
    }
}

/// 字段抽取服务
///
/// 对每个字段依次执行策略链：JSON-LD → OpenGraph →
/// 平台选择器 → 通用选择器 → 启发式兜底。第一条产出
/// 合格值的策略胜出并记入抽取元数据。字段缺失降级为
/// 警告，抽取本身从不使任务失败。
pub struct ExtractionService {
    config: ExtractionConfig,
}

impl ExtractionService {
    /// 创建抽取服务
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// 从抓取到的页面抽取商品字段
    pub fn extract(
        &self,
        html: &str,
        page_url: &Url,
        platform: Platform,
        handler: &mut ErrorHandler,
    ) -> ExtractedProductData {
        let doc = Html::parse_document(html);
        let structured = structured_data::json_ld_product(&doc);
        let table = selector_table::for_platform(platform);

        let mut data = ExtractedProductData {
            platform,
            ..Default::default()
        };

        self.extract_name(&doc, structured.as_ref(), table, &mut data, handler);
        self.extract_description(&doc, structured.as_ref(), table, &mut data, handler);
        self.extract_price(&doc, structured.as_ref(), table, &mut data, handler);
        self.extract_images(&doc, structured.as_ref(), table, page_url, &mut data, handler);
        self.extract_categories(&doc, structured.as_ref(), table, &mut data);

        data.quality = quality::assess(&data);
        debug!(
            name = data.name.as_deref().unwrap_or("<none>"),
            quality = data.quality.percentage,
            "extraction finished"
        );
        data
    }

    fn extract_name(
        &self,
        doc: &Html,
        structured: Option<&StructuredProduct>,
        table: &SelectorTable,
        data: &mut ExtractedProductData,
        handler: &mut ErrorHandler,
    ) {
        let found = structured
            .and_then(|s| s.name.as_deref())
            .and_then(|n| normalized(n, 2))
            .map(|n| (n, "json_ld"))
            .or_else(|| {
                structured_data::og_meta(doc, "og:title")
                    .and_then(|n| normalized(&n, 2))
                    .map(|n| (n, "og_meta"))
            })
            .or_else(|| {
                select_first_text(doc, table.name)
                    .and_then(|n| normalized(&n, 2))
                    .map(|n| (n, "platform_selector"))
            })
            .or_else(|| {
                select_first_text(doc, GENERIC_NAME_SELECTORS)
                    .and_then(|n| normalized(&n, 2))
                    .map(|n| (n, "generic_selector"))
            })
            .or_else(|| {
                page_title(doc)
                    .and_then(|n| normalized(&n, 2))
                    .map(|n| (n, "page_title"))
            });

        match found {
            Some((name, strategy)) => {
                data.meta.record("name", strategy);
                data.name = Some(name);
            }
            None => handler.add_warning(ScraperError::data_validation(
                "Product name could not be extracted",
                None,
            )),
        }
    }

    fn extract_description(
        &self,
        doc: &Html,
        structured: Option<&StructuredProduct>,
        table: &SelectorTable,
        data: &mut ExtractedProductData,
        handler: &mut ErrorHandler,
    ) {
        let found = structured
            .and_then(|s| s.description.as_deref())
            .and_then(|d| normalized(d, 30))
            .map(|d| (d, "json_ld"))
            .or_else(|| {
                structured_data::og_meta(doc, "og:description")
                    .and_then(|d| normalized(&d, 30))
                    .map(|d| (d, "og_meta"))
            })
            .or_else(|| {
                select_first_markup(doc, table.description, 30).map(|d| (d, "platform_selector"))
            })
            .or_else(|| {
                select_first_markup(doc, GENERIC_DESCRIPTION_SELECTORS, 30)
                    .map(|d| (d, "generic_selector"))
            })
            .or_else(|| {
                let block_config = ContentBlockConfig {
                    min_length: self.config.min_description_length,
                    link_density_threshold: self.config.link_density_threshold,
                };
                content_block::largest_content_block(doc, &block_config)
                    .map(|d| (text_normalizer::normalize(&d), "content_block"))
            });

        match found {
            Some((markup, strategy)) => {
                data.meta.record("description", strategy);
                data.description_markup = Some(markup);
            }
            None => handler.add_warning(ScraperError::data_validation(
                "Product description could not be extracted",
                None,
            )),
        }
    }

    fn extract_price(
        &self,
        doc: &Html,
        structured: Option<&StructuredProduct>,
        table: &SelectorTable,
        data: &mut ExtractedProductData,
        handler: &mut ErrorHandler,
    ) {
        for (raw, strategy) in price_candidates(doc, structured, table) {
            match parse_price(&raw, self.config.max_price) {
                Ok(price) => {
                    data.meta.record("price", strategy);
                    data.price = Some(price);
                    return;
                }
                Err(e) => debug!(candidate = %raw, strategy, "price candidate rejected: {}", e),
            }
        }

        handler.add_warning(ScraperError::data_validation(
            "Product price could not be extracted",
            None,
        ));
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_images(
        &self,
        doc: &Html,
        structured: Option<&StructuredProduct>,
        table: &SelectorTable,
        page_url: &Url,
        data: &mut ExtractedProductData,
        handler: &mut ErrorHandler,
    ) {
        let mut seen = HashSet::new();
        let mut images = Vec::new();
        let mut winning_strategy: Option<&str> = None;

        let stages: [(&str, Vec<String>); 4] = [
            (
                "json_ld",
                structured.map(|s| s.images.clone()).unwrap_or_default(),
            ),
            ("og_meta", structured_data::og_meta_all(doc, "og:image")),
            ("platform_selector", select_image_urls(doc, table.images)),
            (
                "generic_selector",
                select_image_urls(doc, GENERIC_IMAGE_SELECTORS),
            ),
        ];

        for (strategy, urls) in stages {
            let before = images.len();
            for raw in urls {
                if images.len() >= self.config.max_images {
                    break;
                }
                if url_utils::is_placeholder_image(&raw) {
                    continue;
                }
                let Ok(absolute) = url_utils::resolve_url(page_url, &raw) else {
                    continue;
                };
                let absolute = absolute.to_string();
                if seen.insert(absolute.clone()) {
                    images.push(absolute);
                }
            }
            if images.len() > before && winning_strategy.is_none() {
                winning_strategy = Some(strategy);
            }
        }

        if let Some(strategy) = winning_strategy {
            data.meta.record("images", strategy);
        }
        if images.is_empty() {
            handler.add_warning(ScraperError::data_validation(
                "No product images were found on the page",
                None,
            ));
        }
        data.images = images;
    }

    fn extract_categories(
        &self,
        doc: &Html,
        structured: Option<&StructuredProduct>,
        table: &SelectorTable,
        data: &mut ExtractedProductData,
    ) {
        let (raw, strategy) = match structured.filter(|s| !s.categories.is_empty()) {
            Some(s) => (s.categories.clone(), "json_ld"),
            None => {
                let selectors = if table.categories.is_empty() {
                    GENERIC_BREADCRUMB_SELECTORS
                } else {
                    table.categories
                };
                (select_texts(doc, selectors), "breadcrumb")
            }
        };

        let mut seen = HashSet::new();
        let categories: Vec<String> = raw
            .iter()
            .map(|c| text_normalizer::normalize(c))
            .filter(|c| c.chars().count() >= 2)
            .filter(|c| !HOME_LABELS.contains(&c.to_lowercase().as_str()))
            .filter(|c| seen.insert(c.clone()))
            .collect();

        if !categories.is_empty() {
            data.meta.record("categories", strategy);
        }
        data.categories = categories;
    }
}

/// 归一化并按最小长度过滤候选文本
fn normalized(raw: &str, min_chars: usize) -> Option<String> {
    let value = text_normalizer::normalize(raw);
    (value.chars().count() >= min_chars).then_some(value)
}

fn select_first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        for element in doc.select(&parsed) {
            let text: String = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// 取第一个文本长度达标的元素的内部HTML
fn select_first_markup(doc: &Html, selectors: &[&str], min_text_chars: usize) -> Option<String> {
    for selector in selectors {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        for element in doc.select(&parsed) {
            let text: String = element.text().collect();
            if text.trim().chars().count() >= min_text_chars {
                return Some(text_normalizer::normalize(element.inner_html().trim()));
            }
        }
    }
    None
}

fn select_texts(doc: &Html, selectors: &[&str]) -> Vec<String> {
    for selector in selectors {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        let texts: Vec<String> = doc
            .select(&parsed)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if !texts.is_empty() {
            return texts;
        }
    }
    Vec::new()
}

/// 价格候选序列，按策略可信度降序
fn price_candidates(
    doc: &Html,
    structured: Option<&StructuredProduct>,
    table: &SelectorTable,
) -> Vec<(String, &'static str)> {
    let mut candidates = Vec::new();

    if let Some(price) = structured.and_then(|s| s.price.clone()) {
        candidates.push((price, "json_ld"));
    }
    for property in ["product:price:amount", "og:price:amount"] {
        if let Some(price) = structured_data::og_meta(doc, property) {
            candidates.push((price, "og_meta"));
        }
    }
    for text in select_texts(doc, table.price).into_iter().take(3) {
        candidates.push((text, "platform_selector"));
    }
    for text in price_element_values(doc).into_iter().take(3) {
        candidates.push((text, "generic_selector"));
    }

    candidates
}

/// 通用价格选择器候选值
///
/// `itemprop=price`元素优先读取content属性，机器可读的
/// 值比显示文本可靠。
fn price_element_values(doc: &Html) -> Vec<String> {
    let mut values = Vec::new();

    for selector in GENERIC_PRICE_SELECTORS {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        for element in doc.select(&parsed) {
            if let Some(content) = element.value().attr("content") {
                if !content.trim().is_empty() {
                    values.push(content.trim().to_string());
                    continue;
                }
            }
            let text: String = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                values.push(text);
            }
        }
        if !values.is_empty() {
            break;
        }
    }
    values
}

/// 从img元素收集图片地址
///
/// 懒加载属性优先于src，图标尺寸的图片被丢弃。
fn select_image_urls(doc: &Html, selectors: &[&str]) -> Vec<String> {
    let mut urls = Vec::new();

    for selector in selectors {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        for element in doc.select(&parsed) {
            let value = element.value();
            if url_utils::is_icon_sized(value.attr("width"), value.attr("height")) {
                continue;
            }
            let src = value
                .attr("data-src")
                .or_else(|| value.attr("data-lazy-src"))
                .or_else(|| value.attr("src"));
            if let Some(src) = src {
                if !src.trim().is_empty() {
                    urls.push(src.trim().to_string());
                }
            }
        }
    }
    urls
}

/// 页面标题兜底
///
/// 去掉标题里常见的站点名后缀，为空时退到第一个h1。
fn page_title(doc: &Html) -> Option<String> {
    static SEPARATORS: &[&str] = &[" | ", " - ", " – "];

    let title_selector = Selector::parse("title").ok()?;
    let title = doc
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>())
        .map(|t| {
            let mut t = t.trim().to_string();
            for sep in SEPARATORS {
                if let Some(idx) = t.find(sep) {
                    t.truncate(idx);
                }
            }
            t.trim().to_string()
        })
        .filter(|t| !t.is_empty());

    title.or_else(|| {
        let h1 = Selector::parse("h1").ok()?;
        doc.select(&h1)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .find(|t| !t.is_empty())
    })
}
