// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 错误分类与累加器
pub mod errors;
/// 价格字符串解析
pub mod price;
/// 重试退避策略
pub mod retry_policy;
/// 波斯语/阿拉伯语文本归一化
pub mod text_normalizer;
/// 日志初始化
pub mod telemetry;
/// URL处理工具
pub mod url_utils;
