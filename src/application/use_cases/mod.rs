// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 重试失败任务
pub mod retry_job;
/// 提交任务与批次
pub mod submit_job;
