// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// JSON-LD中声明的商品节点
///
/// 字段保持原始字符串形态，归一化与价格解析
/// 由抽取器统一处理。
#[derive(Debug, Clone, Default)]
pub struct StructuredProduct {
    /// 商品名称
    pub name: Option<String>,
    /// 商品描述
    pub description: Option<String>,
    /// 原始价格字符串
    pub price: Option<String>,
    /// 图片URL列表
    pub images: Vec<String>,
    /// 分类列表
    pub categories: Vec<String>,
}

/// 在页面的JSON-LD脚本中查找商品节点
///
/// 容忍损坏的JSON脚本（跳过），支持顶层对象、
/// 对象数组以及`@graph`包装，取第一个命中的
/// Product/ProductModel节点。
pub fn json_ld_product(doc: &Html) -> Option<StructuredProduct> {
    for script in doc.select(&LD_JSON) {
        let text: String = script.text().collect();
        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) => continue,
        };
        if let Some(node) = find_product_node(&value) {
            return Some(read_product(node));
        }
    }
    None
}

fn find_product_node(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(map);
            }
            map.get("@graph").and_then(find_product_node)
        }
        Value::Array(items) => items.iter().find_map(find_product_node),
        _ => None,
    }
}

fn is_product_type(type_field: Option<&Value>) -> bool {
    let matches_name = |s: &str| s == "Product" || s == "ProductModel";
    match type_field {
        Some(Value::String(s)) => matches_name(s),
        Some(Value::Array(items)) => items
            .iter()
            .any(|v| v.as_str().is_some_and(matches_name)),
        _ => false,
    }
}

fn read_product(map: &Map<String, Value>) -> StructuredProduct {
    StructuredProduct {
        name: string_field(map, "name"),
        description: string_field(map, "description"),
        price: offer_price(map.get("offers")),
        images: image_urls(map.get("image")),
        categories: category_names(map.get("category")),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 从offers中提取价格字符串
///
/// 支持单个Offer对象、Offer数组以及AggregateOffer的lowPrice。
fn offer_price(offers: Option<&Value>) -> Option<String> {
    match offers {
        Some(Value::Object(o)) => price_field(o),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).find_map(price_field),
        _ => None,
    }
}

fn price_field(offer: &Map<String, Value>) -> Option<String> {
    for key in ["price", "lowPrice", "highPrice"] {
        match offer.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// image字段的三种合法形态：字符串、字符串/ImageObject数组、ImageObject
fn image_urls(image: Option<&Value>) -> Vec<String> {
    match image {
        Some(Value::String(s)) => vec![s.trim().to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(o) => o
                    .get("url")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::Object(o)) => o
            .get("url")
            .and_then(Value::as_str)
            .map(|s| vec![s.trim().to_string()])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn category_names(category: Option<&Value>) -> Vec<String> {
    match category {
        Some(Value::String(s)) => s
            .split(['>', '/'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// 取第一条匹配的OpenGraph/商品meta标签内容
pub fn og_meta(doc: &Html, property: &str) -> Option<String> {
    og_meta_all(doc, property).into_iter().next()
}

/// 取全部匹配的OpenGraph/商品meta标签内容
pub fn og_meta_all(doc: &Html, property: &str) -> Vec<String> {
    let selector = match Selector::parse(&format!(r#"meta[property="{}"]"#, property)) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    doc.select(&selector)
        .filter_map(|m| m.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_top_level_product() {
        let html = r#"<html><head><script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "Product",
         "name": "Widget", "description": "A fine widget",
         "image": "https://shop.ir/w.jpg",
         "offers": {"@type": "Offer", "price": "19.99", "priceCurrency": "USD"}}
        </script></head></html>"#;

        let product = json_ld_product(&parse(html)).unwrap();
        assert_eq!(product.name.as_deref(), Some("Widget"));
        assert_eq!(product.price.as_deref(), Some("19.99"));
        assert_eq!(product.images, vec!["https://shop.ir/w.jpg"]);
    }

    #[test]
    fn test_product_inside_graph() {
        let html = r#"<script type="application/ld+json">
        {"@context": "https://schema.org", "@graph": [
            {"@type": "WebSite", "name": "Shop"},
            {"@type": "Product", "name": "Graph Widget",
             "offers": {"price": 2500000}}
        ]}
        </script>"#;

        let product = json_ld_product(&parse(html)).unwrap();
        assert_eq!(product.name.as_deref(), Some("Graph Widget"));
        assert_eq!(product.price.as_deref(), Some("2500000"));
    }

    #[test]
    fn test_aggregate_offer_low_price() {
        let html = r#"<script type="application/ld+json">
        {"@type": "Product", "name": "X",
         "offers": {"@type": "AggregateOffer", "lowPrice": "120000", "highPrice": "150000"}}
        </script>"#;

        let product = json_ld_product(&parse(html)).unwrap();
        assert_eq!(product.price.as_deref(), Some("120000"));
    }

    #[test]
    fn test_image_object_array() {
        let html = r#"<script type="application/ld+json">
        {"@type": "Product", "name": "X",
         "image": [{"@type": "ImageObject", "url": "https://a/1.jpg"}, "https://a/2.jpg"]}
        </script>"#;

        let product = json_ld_product(&parse(html)).unwrap();
        assert_eq!(product.images, vec!["https://a/1.jpg", "https://a/2.jpg"]);
    }

    #[test]
    fn test_broken_script_is_skipped() {
        let html = r#"
        <script type="application/ld+json">{not valid json</script>
        <script type="application/ld+json">{"@type": "Product", "name": "Survivor"}</script>"#;

        let product = json_ld_product(&parse(html)).unwrap();
        assert_eq!(product.name.as_deref(), Some("Survivor"));
    }

    #[test]
    fn test_no_product_node() {
        let html = r#"<script type="application/ld+json">
        {"@type": "BreadcrumbList", "itemListElement": []}</script>"#;
        assert!(json_ld_product(&parse(html)).is_none());
    }

    #[test]
    fn test_og_meta() {
        let html = r#"<head>
            <meta property="og:title" content="Meta Widget">
            <meta property="og:image" content="https://a/1.jpg">
            <meta property="og:image" content="https://a/2.jpg">
        </head>"#;
        let doc = parse(html);

        assert_eq!(og_meta(&doc, "og:title").as_deref(), Some("Meta Widget"));
        assert_eq!(og_meta_all(&doc, "og:image").len(), 2);
        assert!(og_meta(&doc, "og:description").is_none());
    }
}
