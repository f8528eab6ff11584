// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_job::{JobStatus, ScrapeJob};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 抓取批次实体
///
/// 一起提交的一组任务。计数器永远是成员任务状态的
/// 纯函数，每当成员任务到达终止状态后重新计算。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeBatch {
    /// 批次唯一标识符
    pub id: Uuid,
    /// 批次名称（可选）
    pub name: Option<String>,
    /// 所属商家ID
    pub vendor_id: Uuid,
    /// 派生的批次状态
    pub status: BatchStatus,
    /// 成员任务总数
    pub total: u32,
    /// 完成数（含带警告完成）
    pub completed: u32,
    /// 失败数
    pub failed: u32,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 结束时间（只在首次到达终止状态时写入一次）
    pub completed_at: Option<DateTime<Utc>>,
    /// 序列化的报告快照
    pub report: Option<serde_json::Value>,
}

/// 批次状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// 仍有成员任务未结束
    #[default]
    Processing,
    /// 全部结束且无失败
    Completed,
    /// 全部结束但存在失败任务
    CompletedWithErrors,
}

impl BatchStatus {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BatchStatus::Processing)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
            BatchStatus::CompletedWithErrors => "completed_with_errors",
        };
        write!(f, "{}", s)
    }
}

impl ScrapeBatch {
    /// 创建一个新批次
    pub fn new(name: Option<String>, vendor_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            vendor_id,
            status: BatchStatus::Processing,
            total: 0,
            completed: 0,
            failed: 0,
            started_at: Utc::now(),
            completed_at: None,
            report: None,
        }
    }

    /// 根据成员任务状态重新计算计数器与批次状态
    ///
    /// `completed_at`只在批次首次到达终止状态时写入。
    pub fn recompute(&mut self, jobs: &[ScrapeJob]) {
        self.total = jobs.len() as u32;
        self.completed = jobs.iter().filter(|j| j.status.is_completed()).count() as u32;
        self.failed = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Failed)
            .count() as u32;

        let any_open = jobs.iter().any(|j| !j.status.is_terminal());

        self.status = if any_open || jobs.is_empty() {
            BatchStatus::Processing
        } else if self.failed == 0 {
            BatchStatus::Completed
        } else {
            BatchStatus::CompletedWithErrors
        };

        if self.status.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }

    /// 成功率（百分比，一位小数）
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let rate = self.completed as f64 / self.total as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }

    /// 批次耗时（秒）
    pub fn duration_seconds(&self) -> f64 {
        let end = self.completed_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
