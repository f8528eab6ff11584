// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 电商平台标签
///
/// 平台检测器的分类结果。标签只决定抽取器查询哪张
/// 选择器表，不改变抽取逻辑本身。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// WooCommerce（WordPress插件）
    Woocommerce,
    /// 裸WordPress（含页面构建器）
    Wordpress,
    /// Shopify
    Shopify,
    /// Magento
    Magento,
    /// PrestaShop
    Prestashop,
    /// OpenCart
    Opencart,
    /// 自建或未识别平台
    #[default]
    Custom,
}

impl Platform {
    /// 平台检测是否命中了已知签名
    pub fn is_known(&self) -> bool {
        !matches!(self, Platform::Custom)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Platform::Woocommerce => "woocommerce",
            Platform::Wordpress => "wordpress",
            Platform::Shopify => "shopify",
            Platform::Magento => "magento",
            Platform::Prestashop => "prestashop",
            Platform::Opencart => "opencart",
            Platform::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "woocommerce" => Ok(Platform::Woocommerce),
            "wordpress" => Ok(Platform::Wordpress),
            "shopify" => Ok(Platform::Shopify),
            "magento" => Ok(Platform::Magento),
            "prestashop" => Ok(Platform::Prestashop),
            "opencart" => Ok(Platform::Opencart),
            "custom" => Ok(Platform::Custom),
            _ => Err(()),
        }
    }
}
