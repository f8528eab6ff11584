// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::extracted::ExtractedProductData;
use crate::domain::models::product::{Product, ProductImage, ProductStatus};
use crate::domain::models::scrape_job::ScrapeJob;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::repositories::RepositoryError;
use crate::utils::errors::{ErrorHandler, ScraperError};
use chrono::Utc;
use deunicode::deunicode;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

/// 落库配置
#[derive(Debug, Clone)]
pub struct MaterializerConfig {
    /// slug冲突时随机后缀的重试上限
    pub slug_max_attempts: u32,
    /// 单张图片下载超时
    pub image_timeout: Duration,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            slug_max_attempts: 5,
            image_timeout: Duration::from_secs(15),
        }
    }
}

/// 商品落库服务
///
/// 把抽取结果转成草稿商品：生成唯一slug、顺序下载图片、
/// 原子插入。单张图片失败记LOW警告继续，数据库失败是
/// 本流程里唯一的致命错误。
pub struct ProductMaterializer<P: ProductRepository> {
    repository: Arc<P>,
    config: MaterializerConfig,
    client: reqwest::Client,
}

impl<P: ProductRepository> ProductMaterializer<P> {
    /// 创建落库服务
    pub fn new(repository: Arc<P>, config: MaterializerConfig) -> Self {
        Self {
            repository,
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 把抽取结果物化为草稿商品
    pub async fn materialize(
        &self,
        job: &ScrapeJob,
        data: &ExtractedProductData,
        handler: &mut ErrorHandler,
    ) -> Result<Product, ScraperError> {
        let name = data.name.clone().ok_or_else(|| {
            ScraperError::data_validation("Cannot create a product draft without a name", None)
        })?;

        let images = self.download_images(&data.images, handler).await;

        let mut product = Product {
            id: Uuid::new_v4(),
            vendor_id: job.vendor_id,
            name: name.clone(),
            slug: String::new(),
            description: data.description_markup.clone(),
            price: data.price,
            status: ProductStatus::Draft,
            images,
            source_url: job.url.clone(),
            created_at: Utc::now(),
        };

        let base = slugify(&name);

        // Random suffixes first; the timestamp suffix is the last resort
        // and cannot collide in practice.
        for attempt in 0..=self.config.slug_max_attempts {
            product.slug = if attempt < self.config.slug_max_attempts {
                format!("{}-{}", base, random_suffix(6))
            } else {
                format!("{}-{}", base, Utc::now().timestamp_millis())
            };

            match self.repository.insert(&product).await {
                Ok(created) => {
                    debug!(product = %created.id, slug = %created.slug, "product draft created");
                    return Ok(created);
                }
                Err(RepositoryError::UniqueViolation(_)) => {
                    warn!(slug = %product.slug, attempt, "slug conflict, regenerating");
                    continue;
                }
                Err(e) => {
                    return Err(ScraperError::database(
                        "Failed to persist product draft",
                        Some(e.to_string()),
                    ))
                }
            }
        }

        Err(ScraperError::database(
            "Could not find a free slug for the product draft",
            Some(base),
        ))
    }

    /// 顺序下载商品图片
    ///
    /// 第一张下载成功的图片标记为主图。
    async fn download_images(
        &self,
        urls: &[String],
        handler: &mut ErrorHandler,
    ) -> Vec<ProductImage> {
        let mut images = Vec::new();
        let mut have_primary = false;

        for url in urls {
            match self.download(url).await {
                Ok(()) => {
                    images.push(ProductImage {
                        url: url.clone(),
                        is_primary: !have_primary,
                    });
                    have_primary = true;
                }
                Err(reason) => handler.add_warning(ScraperError::image_download(
                    format!("Failed to download image {}", url),
                    Some(reason),
                )),
            }
        }
        images
    }

    async fn download(&self, url: &str) -> Result<(), String> {
        let response = timeout(self.config.image_timeout, self.client.get(url).send())
            .await
            .map_err(|_| "download timed out".to_string())?
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }

        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            let value = content_type.to_str().unwrap_or("");
            if !value.starts_with("image/") {
                return Err(format!("unexpected content type: {}", value));
            }
        }

        let bytes = timeout(self.config.image_timeout, response.bytes())
            .await
            .map_err(|_| "download timed out".to_string())?
            .map_err(|e| e.to_string())?;

        if bytes.is_empty() {
            return Err("empty response body".to_string());
        }
        Ok(())
    }
}

/// 由商品名生成slug主干
///
/// 波斯文经由音译转成ASCII，非字母数字折叠为单个连字符。
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(name).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut previous_dash = true;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            previous_dash = false;
        } else if !previous_dash {
            slug.push('-');
            previous_dash = true;
        }
    }

    let slug: String = slug.trim_end_matches('-').chars().take(60).collect();
    if slug.is_empty() {
        "product".to_string()
    } else {
        slug.trim_end_matches('-').to_string()
    }
}

fn random_suffix(length: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    (0..length)
        .map(|_| CHARSET[rand::random_range(0..CHARSET.len())] as char)
        .collect()
}
