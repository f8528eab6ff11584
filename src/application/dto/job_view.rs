// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::extracted::ExtractedProductData;
use crate::domain::models::scrape_job::ScrapeJob;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 任务对外视图
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    /// 任务ID
    pub id: Uuid,
    /// 目标URL
    pub url: String,
    /// 任务状态
    pub status: String,
    /// 主错误信息
    pub error_message: Option<String>,
    /// 结构化错误报告
    pub error_report: Option<serde_json::Value>,
    /// 抽取结果
    pub extracted_data: Option<ExtractedProductData>,
    /// 已重试次数
    pub retry_count: i32,
    /// 创建的商品ID
    pub created_product_id: Option<Uuid>,
    /// 抽取质量百分比
    pub quality_percentage: Option<f64>,
    /// 处理完成时间
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<&ScrapeJob> for JobView {
    fn from(job: &ScrapeJob) -> Self {
        Self {
            id: job.id,
            url: job.url.clone(),
            status: job.status.to_string(),
            error_message: job.error_message.clone(),
            error_report: job.error_report.clone(),
            extracted_data: job.extracted_data.clone(),
            retry_count: job.retry_count,
            created_product_id: job.created_product_id,
            quality_percentage: job
                .extracted_data
                .as_ref()
                .map(|d| d.quality.percentage),
            processed_at: job.processed_at,
        }
    }
}
