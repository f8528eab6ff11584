// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 浏览器回退引擎
pub mod browser_engine;
/// 会话级熔断器
pub mod circuit_breaker;
/// 抓取编排（重试、SSL回退、浏览器回退）
pub mod fetcher;
/// 静态HTTP引擎
pub mod http_engine;
/// 引擎特质与请求/响应类型
pub mod traits;
/// 响应校验
pub mod validators;
