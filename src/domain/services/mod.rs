// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 正文块启发式
pub mod content_block;
/// 字段抽取服务
pub mod extraction_service;
/// 平台检测器
pub mod platform_detector;
/// 商品落库服务
pub mod product_materializer;
/// 质量评估
pub mod quality;
/// 平台选择器表
pub mod selector_table;
/// 结构化数据解析
pub mod structured_data;
