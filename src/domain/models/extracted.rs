// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::platform::Platform;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 抽取结果值对象
///
/// 一次抽取的全部产物，仅由产生它的任务持有，
/// 不单独持久化。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedProductData {
    /// 商品名称
    pub name: Option<String>,
    /// 商品描述（保留标记的HTML片段）
    pub description_markup: Option<String>,
    /// 价格
    pub price: Option<Decimal>,
    /// 商品图片URL列表（绝对地址，去重，有上限）
    pub images: Vec<String>,
    /// 分类面包屑
    pub categories: Vec<String>,
    /// 检测到的平台
    pub platform: Platform,
    /// 质量评估
    pub quality: QualityAssessment,
    /// 抽取元数据
    pub meta: ExtractionMeta,
}

/// 抽取元数据
///
/// 记录每个字段由哪条策略胜出，用于诊断。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMeta {
    /// 字段名 → 胜出策略名
    pub strategies: HashMap<String, String>,
}

impl ExtractionMeta {
    /// 记录字段的胜出策略
    pub fn record(&mut self, field: &str, strategy: &str) {
        self.strategies
            .insert(field.to_string(), strategy.to_string());
    }

    /// 查询字段的胜出策略
    pub fn strategy_for(&self, field: &str) -> Option<&str> {
        self.strategies.get(field).map(|s| s.as_str())
    }
}

/// 质量评估
///
/// 仅供参考的完整度/置信度指标，不改变任务状态。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// 归一化得分 [0,1]
    pub score: f64,
    /// 百分比（保留一位小数）
    pub percentage: f64,
    /// 人类可读的问题列表
    pub issues: Vec<String>,
}
