// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 批次仓库特质
pub mod batch_repository;
/// 任务仓库特质
pub mod job_repository;
/// 商品仓库特质
pub mod product_repository;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(String),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 唯一约束冲突
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),
}
