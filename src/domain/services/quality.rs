// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::extracted::{ExtractedProductData, QualityAssessment};

/// 评估抽取结果的完整度
///
/// 加权打分：名称25、描述25（按长度分档）、价格25、
/// 图片15（按张数分档）、平台识别10。得分只作为
/// 草稿审核的参考指标，不影响任务状态。
pub fn assess(data: &ExtractedProductData) -> QualityAssessment {
    let mut score: f64 = 0.0;
    let mut issues = Vec::new();

    match &data.name {
        Some(name) if name.chars().count() >= 3 => score += 25.0,
        Some(_) => {
            score += 10.0;
            issues.push("product name is suspiciously short".to_string());
        }
        None => issues.push("product name is missing".to_string()),
    }

    // Length tiers count characters, not bytes
    match &data.description_markup {
        Some(desc) if desc.chars().count() >= 300 => score += 25.0,
        Some(desc) if desc.chars().count() >= 100 => {
            score += 15.0;
            issues.push("description is short".to_string());
        }
        Some(_) => {
            score += 8.0;
            issues.push("description is very short".to_string());
        }
        None => issues.push("description is missing".to_string()),
    }

    if data.price.is_some() {
        score += 25.0;
    } else {
        issues.push("price is missing".to_string());
    }

    match data.images.len() {
        0 => issues.push("no product images".to_string()),
        1 | 2 => {
            score += 8.0;
            issues.push("fewer than three product images".to_string());
        }
        _ => score += 15.0,
    }

    if data.platform.is_known() {
        score += 10.0;
    } else {
        score += 5.0;
        issues.push("platform not recognized, generic selectors used".to_string());
    }

    let score = (score / 100.0).clamp(0.0, 1.0);
    QualityAssessment {
        score,
        percentage: (score * 1000.0).round() / 10.0,
        issues,
    }
}
