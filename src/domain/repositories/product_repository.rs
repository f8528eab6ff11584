// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::product::Product;
use crate::domain::repositories::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 商品仓库特质
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 原子地插入商品
    ///
    /// slug冲突返回`RepositoryError::UniqueViolation`，
    /// 插入要么完整成功要么毫无痕迹。
    async fn insert(&self, product: &Product) -> Result<Product, RepositoryError>;
    /// 根据ID查找商品
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;
    /// 根据slug查找商品
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError>;
}
