// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_batch::ScrapeBatch;
use crate::domain::models::scrape_job::{JobStatus, ScrapeJob};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 批次报告
///
/// 批次到达终止状态时生成一次并随批次保存。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// 批次ID
    pub batch_id: Uuid,
    /// 批次名称
    pub name: Option<String>,
    /// 批次状态
    pub status: String,
    /// 统计摘要
    pub summary: BatchSummary,
    /// 无警告完成的任务
    pub successful_jobs: Vec<JobLine>,
    /// 带警告完成的任务
    pub warning_jobs: Vec<JobLine>,
    /// 失败的任务
    pub failed_jobs: Vec<JobLine>,
}

/// 批次统计摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// 成员任务总数
    pub total: u32,
    /// 完成数（含带警告完成）
    pub completed: u32,
    /// 失败数
    pub failed: u32,
    /// 成功率（百分比，一位小数）
    pub success_rate: f64,
    /// 批次耗时（秒）
    pub duration_seconds: f64,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 结束时间
    pub completed_at: Option<DateTime<Utc>>,
}

/// 报告中的单任务行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLine {
    /// 任务ID
    pub job_id: Uuid,
    /// 目标URL
    pub url: String,
    /// 创建的商品ID
    pub product_id: Option<Uuid>,
    /// 抽取质量百分比
    pub quality_percentage: Option<f64>,
    /// 主错误信息
    pub error: Option<String>,
}

impl JobLine {
    fn from_job(job: &ScrapeJob) -> Self {
        Self {
            job_id: job.id,
            url: job.url.clone(),
            product_id: job.created_product_id,
            quality_percentage: job
                .extracted_data
                .as_ref()
                .map(|d| d.quality.percentage),
            error: job.error_message.clone(),
        }
    }
}

impl BatchReport {
    /// 由批次和成员任务生成报告
    pub fn generate(batch: &ScrapeBatch, jobs: &[ScrapeJob]) -> Self {
        let collect = |status: JobStatus| -> Vec<JobLine> {
            jobs.iter()
                .filter(|j| j.status == status)
                .map(JobLine::from_job)
                .collect()
        };

        Self {
            batch_id: batch.id,
            name: batch.name.clone(),
            status: batch.status.to_string(),
            summary: BatchSummary {
                total: batch.total,
                completed: batch.completed,
                failed: batch.failed,
                success_rate: batch.success_rate(),
                duration_seconds: batch.duration_seconds(),
                started_at: batch.started_at,
                completed_at: batch.completed_at,
            },
            successful_jobs: collect(JobStatus::Completed),
            warning_jobs: collect(JobStatus::CompletedWithWarnings),
            failed_jobs: collect(JobStatus::Failed),
        }
    }
}
