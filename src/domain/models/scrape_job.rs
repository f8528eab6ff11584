// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::extracted::ExtractedProductData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 抓取任务实体
///
/// 表示针对单个URL的一次抽取尝试。任务由提交方创建，
/// 经由抓取/抽取流水线推进状态，引擎从不删除任务
/// （删除是外部管理动作）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeJob {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 目标商品页URL
    pub url: String,
    /// 所属商家ID
    pub vendor_id: Uuid,
    /// 供应商ID（可选）
    pub supplier_id: Option<Uuid>,
    /// 所属批次ID（可选）
    pub batch_id: Option<Uuid>,
    /// 任务状态
    pub status: JobStatus,
    /// 主错误信息（人类可读）
    pub error_message: Option<String>,
    /// 结构化错误报告快照
    pub error_report: Option<serde_json::Value>,
    /// 抽取结果
    pub extracted_data: Option<ExtractedProductData>,
    /// 已重试次数
    pub retry_count: i32,
    /// 上次重试时间
    pub last_retry_at: Option<DateTime<Utc>>,
    /// 由本任务创建的商品ID（仅完成状态可非空）
    pub created_product_id: Option<Uuid>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 处理完成时间
    pub processed_at: Option<DateTime<Utc>>,
}

/// 任务状态枚举
///
/// 单次尝试内状态单向推进：
/// Pending → Processing → Completed/CompletedWithWarnings/Failed。
/// 失败任务只能通过显式重试动作回到Processing。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已创建，尚未开始处理
    #[default]
    Pending,
    /// 抓取/抽取进行中
    Processing,
    /// 完成且没有任何警告
    Completed,
    /// 完成但至少记录了一条非致命警告
    CompletedWithWarnings,
    /// 失败（错误处理器判定不再自动重试）
    Failed,
}

impl JobStatus {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::CompletedWithWarnings | JobStatus::Failed
        )
    }

    /// 是否为成功完成（含带警告完成）
    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::CompletedWithWarnings)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::CompletedWithWarnings => "completed_with_warnings",
            JobStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "completed_with_warnings" => Ok(JobStatus::CompletedWithWarnings),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {0}")]
    InvalidStateTransition(JobStatus),

    /// 违反不变量
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl ScrapeJob {
    /// 创建一个新的待处理任务
    pub fn new(url: String, vendor_id: Uuid, supplier_id: Option<Uuid>, batch_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            vendor_id,
            supplier_id,
            batch_id,
            status: JobStatus::Pending,
            error_message: None,
            error_report: None,
            extracted_data: None,
            retry_count: 0,
            last_retry_at: None,
            created_product_id: None,
            created_at: Utc::now(),
            processed_at: None,
        }
    }

    /// 开始处理
    ///
    /// Pending → Processing
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Pending => {
                self.status = JobStatus::Processing;
                Ok(self)
            }
            other => Err(DomainError::InvalidStateTransition(other)),
        }
    }

    /// 无警告完成
    ///
    /// Processing → Completed
    pub fn complete(mut self, data: ExtractedProductData) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Processing => {
                self.status = JobStatus::Completed;
                self.extracted_data = Some(data);
                self.error_message = None;
                self.processed_at = Some(Utc::now());
                Ok(self)
            }
            other => Err(DomainError::InvalidStateTransition(other)),
        }
    }

    /// 带警告完成
    ///
    /// Processing → CompletedWithWarnings，警告随错误报告保存。
    pub fn complete_with_warnings(
        mut self,
        data: ExtractedProductData,
        report: serde_json::Value,
    ) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Processing => {
                self.status = JobStatus::CompletedWithWarnings;
                self.extracted_data = Some(data);
                self.error_report = Some(report);
                self.processed_at = Some(Utc::now());
                Ok(self)
            }
            other => Err(DomainError::InvalidStateTransition(other)),
        }
    }

    /// 标记失败
    ///
    /// Processing → Failed，填充主错误信息与报告。
    pub fn fail(mut self, message: String, report: serde_json::Value) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Processing => {
                self.status = JobStatus::Failed;
                self.error_message = Some(message);
                self.error_report = Some(report);
                self.processed_at = Some(Utc::now());
                Ok(self)
            }
            other => Err(DomainError::InvalidStateTransition(other)),
        }
    }

    /// 外部重试动作
    ///
    /// 唯一能离开终止状态的路径：Failed → Processing，
    /// 递增重试计数并记录重试时间。
    pub fn retry(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Failed => {
                self.status = JobStatus::Processing;
                self.retry_count += 1;
                self.last_retry_at = Some(Utc::now());
                self.error_message = None;
                self.created_product_id = None;
                Ok(self)
            }
            other => Err(DomainError::InvalidStateTransition(other)),
        }
    }

    /// 关联由本任务创建的商品
    ///
    /// 不变量：仅完成状态的任务可以持有商品引用。
    pub fn attach_product(&mut self, product_id: Uuid) -> Result<(), DomainError> {
        if !self.status.is_completed() {
            return Err(DomainError::InvariantViolation(format!(
                "created_product_id requires a completed status, job is {}",
                self.status
            )));
        }
        self.created_product_id = Some(product_id);
        Ok(())
    }
}
