// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器管理
pub mod manager;
/// 抓取工作器
pub mod scrape_worker;
