// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::platform::Platform;
use tracing::debug;

/// 平台签名表
///
/// 按特异性降序排列，WooCommerce必须排在裸WordPress之前，
/// 因为每个WooCommerce站点同时携带WordPress标记。
const SIGNATURES: &[(Platform, &[&str])] = &[
    (
        Platform::Woocommerce,
        &[
            "wp-content/plugins/woocommerce",
            "woocommerce-product-gallery",
            "woocommerce-page",
            "class=\"woocommerce",
            "woocommerce_params",
        ],
    ),
    (
        Platform::Shopify,
        &[
            "cdn.shopify.com",
            "shopify.theme",
            "content=\"shopify",
            "/cdn/shop/products/",
            "shopify-section",
        ],
    ),
    (
        Platform::Magento,
        &[
            "text/x-magento-init",
            "data-mage-init",
            "mage/cookies",
            "content=\"magento",
        ],
    ),
    (
        Platform::Prestashop,
        &[
            "content=\"prestashop",
            "var prestashop",
            "/modules/ps_",
            "prestashop =",
        ],
    ),
    (
        Platform::Opencart,
        &[
            "catalog/view/theme",
            "index.php?route=product/product",
            "route=common/home",
        ],
    ),
    (
        Platform::Wordpress,
        &[
            "content=\"wordpress",
            "/wp-content/",
            "/wp-includes/",
            "/wp-json/",
        ],
    ),
];

/// 检测页面所属的电商平台
///
/// 对原始HTML做大小写不敏感的签名匹配，第一条命中的
/// 签名决定结果，全部未命中返回`Platform::Custom`。
pub fn detect(html: &str) -> Platform {
    let lowered = html.to_lowercase();

    for (platform, markers) in SIGNATURES {
        if let Some(marker) = markers.iter().find(|m| lowered.contains(*m)) {
            debug!(%platform, marker, "platform signature matched");
            return *platform;
        }
    }

    debug!("no platform signature matched, treating as custom");
    Platform::Custom
}
