// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抽取结果值对象
pub mod extracted;
/// 平台标签
pub mod platform;
/// 商品实体
pub mod product;
/// 批次实体
pub mod scrape_batch;
/// 任务实体
pub mod scrape_job;
