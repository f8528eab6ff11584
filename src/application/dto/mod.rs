// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 批次报告
pub mod batch_report;
/// 任务视图
pub mod job_view;
/// 提交请求
pub mod submit_request;
