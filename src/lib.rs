// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! extractrs - 电商商品页抓取与抽取引擎
//!
//! 接收商品页URL，抓取页面（含重试、熔断、SSL降级与
//! 浏览器回退），检测电商平台，按策略链抽取商品字段，
//! 对波斯文内容做归一化，最终把抽取结果物化为草稿商品。
//! 任务与批次的状态机保证每一次尝试都有明确的终态和
//! 结构化的错误报告。

/// 应用层：用例与DTO
pub mod application;
/// 配置管理
pub mod config;
/// 领域层：模型、仓库特质与服务
pub mod domain;
/// 抓取引擎
pub mod engines;
/// 基础设施层：仓库实现
pub mod infrastructure;
/// 任务队列
pub mod queue;
/// 工具模块
pub mod utils;
/// 工作器
pub mod workers;
