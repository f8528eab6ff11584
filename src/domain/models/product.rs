// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 商品实体
///
/// 抽取结果落库生成的草稿商品。引擎只创建草稿，
/// 上架与编辑属于外部管理界面。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// 商品唯一标识符
    pub id: Uuid,
    /// 所属商家ID
    pub vendor_id: Uuid,
    /// 商品名称（已归一化）
    pub name: String,
    /// 唯一slug
    pub slug: String,
    /// 描述（HTML片段）
    pub description: Option<String>,
    /// 价格
    pub price: Option<Decimal>,
    /// 商品状态
    pub status: ProductStatus,
    /// 已附加的图片
    pub images: Vec<ProductImage>,
    /// 来源页URL
    pub source_url: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 商品状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// 草稿（未上架）
    #[default]
    Draft,
    /// 已上架
    Active,
}

/// 商品图片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    /// 图片来源URL
    pub url: String,
    /// 是否主图（首张下载成功的图片）
    pub is_primary: bool,
}
