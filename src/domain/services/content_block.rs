// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static CANDIDATES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article, section, div").unwrap());
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// 类名/ID含有这些关键词的块不是商品描述
const EXCLUDED_KEYWORDS: &[&str] = &[
    "header",
    "footer",
    "nav",
    "menu",
    "sidebar",
    "breadcrumb",
    "comment",
    "related",
    "widget",
    "cart",
    "modal",
    "popup",
];

/// 正文块启发式配置
#[derive(Debug, Clone)]
pub struct ContentBlockConfig {
    /// 正文最小长度（非空白字符数）
    pub min_length: usize,
    /// 链接密度阈值（每100字符的链接数）
    pub link_density_threshold: f64,
}

impl Default for ContentBlockConfig {
    fn default() -> Self {
        Self {
            min_length: 150,
            link_density_threshold: 1.0,
        }
    }
}

/// 选出页面中最大的合格正文块
///
/// 候选块要求：不位于排除区域内、文本长度达到下限、
/// 链接密度不超过阈值。在全部合格候选中取文本最长的
/// 一个，返回其内部HTML。导航和页脚的链接密度远超
/// 商品描述，会被阈值自然排除。
pub fn largest_content_block(doc: &Html, config: &ContentBlockConfig) -> Option<String> {
    let mut best: Option<(usize, String)> = None;

    for element in doc.select(&CANDIDATES) {
        if is_excluded(&element) {
            continue;
        }

        let text: String = element.text().collect();
        let text_len = text.chars().filter(|c| !c.is_whitespace()).count();
        if text_len < config.min_length {
            continue;
        }

        let link_count = element.select(&LINKS).count();
        let density = link_count as f64 * 100.0 / text_len as f64;
        if density > config.link_density_threshold {
            continue;
        }

        if best.as_ref().map_or(true, |(len, _)| text_len > *len) {
            best = Some((text_len, element.inner_html().trim().to_string()));
        }
    }

    best.map(|(_, html)| html)
}

fn is_excluded(element: &ElementRef) -> bool {
    let mut current = Some(*element);
    while let Some(node) = current {
        let tag = node.value().name();
        if matches!(tag, "header" | "footer" | "nav" | "aside" | "form") {
            return true;
        }

        let classes = node.value().attr("class").unwrap_or("").to_lowercase();
        let id = node.value().attr("id").unwrap_or("").to_lowercase();
        if EXCLUDED_KEYWORDS
            .iter()
            .any(|k| classes.contains(k) || id.contains(k))
        {
            return true;
        }

        current = node.parent().and_then(ElementRef::wrap);
    }
    false
}
