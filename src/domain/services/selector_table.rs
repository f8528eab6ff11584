// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::platform::Platform;

/// 平台选择器表
///
/// 每个已知平台一张静态CSS选择器表，选择器按可信度
/// 降序排列，抽取器取第一条命中的结果。
#[derive(Debug)]
pub struct SelectorTable {
    /// 商品名称选择器
    pub name: &'static [&'static str],
    /// 商品描述选择器
    pub description: &'static [&'static str],
    /// 价格选择器
    pub price: &'static [&'static str],
    /// 商品图片选择器
    pub images: &'static [&'static str],
    /// 分类面包屑选择器
    pub categories: &'static [&'static str],
}

static WOOCOMMERCE: SelectorTable = SelectorTable {
    name: &["h1.product_title", ".product_title", ".summary h1"],
    description: &[
        "#tab-description",
        "div.woocommerce-Tabs-panel--description",
        ".woocommerce-product-details__short-description",
        ".product .summary .description",
    ],
    price: &[
        ".summary .price ins .woocommerce-Price-amount",
        ".summary .price .woocommerce-Price-amount",
        "p.price .woocommerce-Price-amount",
        "p.price",
    ],
    images: &[
        ".woocommerce-product-gallery__image img",
        ".woocommerce-product-gallery img",
        ".images img",
    ],
    categories: &[".posted_in a", "nav.woocommerce-breadcrumb a"],
};

static WORDPRESS: SelectorTable = SelectorTable {
    name: &["h1.entry-title", ".elementor-heading-title", "article h1"],
    description: &[
        ".entry-content",
        ".elementor-widget-theme-post-content",
        "article .content",
    ],
    price: &[".price", ".product-price"],
    images: &[".entry-content img", "img.wp-post-image", "figure img"],
    categories: &[".breadcrumb a", ".rank-math-breadcrumb a"],
};

static SHOPIFY: SelectorTable = SelectorTable {
    name: &[
        ".product__title h1",
        "h1.product-single__title",
        "h1.product__title",
    ],
    description: &[
        ".product__description",
        ".product-single__description",
        "#product-description",
    ],
    price: &[
        ".price__regular .price-item",
        "span.price-item--regular",
        ".product__price",
        ".product-single__price",
    ],
    images: &[
        ".product__media img",
        ".product-single__photo img",
        ".product__photo img",
    ],
    categories: &[".breadcrumb a", "nav.breadcrumbs a"],
};

static MAGENTO: SelectorTable = SelectorTable {
    name: &[".page-title .base", "h1.page-title"],
    description: &[
        ".product.attribute.description .value",
        "#description",
        ".product-description",
    ],
    price: &[".product-info-price .price", "span.price"],
    images: &[".gallery-placeholder img", ".fotorama__img"],
    categories: &[".breadcrumbs a"],
};

static PRESTASHOP: SelectorTable = SelectorTable {
    name: &["h1.product-name", "h1[itemprop=name]"],
    description: &[
        "#description .product-description",
        ".product-description",
        "#short_description_content",
    ],
    price: &[
        ".current-price span[itemprop=price]",
        ".current-price",
        "#our_price_display",
    ],
    images: &[
        ".product-cover img",
        "#image-block img",
        ".js-qv-product-images img",
    ],
    categories: &[".breadcrumb a"],
};

static OPENCART: SelectorTable = SelectorTable {
    name: &["#content h1", ".product-info h1"],
    description: &["#tab-description", ".product-info .description"],
    price: &[".product-price", ".price-new", "#content .price"],
    images: &[".thumbnails img", "#content .image img", ".product-image img"],
    categories: &[".breadcrumb a"],
};

// Unrecognized platforms rely entirely on the generic stages.
static CUSTOM: SelectorTable = SelectorTable {
    name: &[],
    description: &[],
    price: &[],
    images: &[],
    categories: &[],
};

/// 取平台对应的选择器表
pub fn for_platform(platform: Platform) -> &'static SelectorTable {
    match platform {
        Platform::Woocommerce => &WOOCOMMERCE,
        Platform::Wordpress => &WORDPRESS,
        Platform::Shopify => &SHOPIFY,
        Platform::Magento => &MAGENTO,
        Platform::Prestashop => &PRESTASHOP,
        Platform::Opencart => &OPENCART,
        Platform::Custom => &CUSTOM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_every_selector_parses() {
        for platform in [
            Platform::Woocommerce,
            Platform::Wordpress,
            Platform::Shopify,
            Platform::Magento,
            Platform::Prestashop,
            Platform::Opencart,
            Platform::Custom,
        ] {
            let table = for_platform(platform);
            for group in [
                table.name,
                table.description,
                table.price,
                table.images,
                table.categories,
            ] {
                for selector in group {
                    assert!(
                        Selector::parse(selector).is_ok(),
                        "invalid selector for {}: {}",
                        platform,
                        selector
                    );
                }
            }
        }
    }

    #[test]
    fn test_custom_table_is_empty() {
        let table = for_platform(Platform::Custom);
        assert!(table.name.is_empty());
        assert!(table.price.is_empty());
    }
}
