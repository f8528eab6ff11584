// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含抓取、重试、抽取、落库和工作器的所有配置项
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// 抓取配置
    pub fetch: FetchSettings,
    /// 重试配置
    pub retry: RetrySettings,
    /// 抽取配置
    pub extraction: ExtractionSettings,
    /// 商品落库配置
    pub materializer: MaterializerSettings,
    /// 工作器配置
    pub worker: WorkerSettings,
}

/// 抓取配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct FetchSettings {
    /// 单次尝试超时（秒）
    pub timeout_secs: u64,
    /// 是否使用系统代理（默认绕过）
    pub use_proxy: bool,
    /// 响应体最小长度（字节）
    pub min_content_length: usize,
    /// 是否启用浏览器回退
    pub browser_fallback: bool,
    /// 熔断器连续失败阈值
    pub circuit_failure_threshold: u32,
    /// 熔断器恢复超时（秒）
    pub circuit_recovery_secs: u64,
    /// Accept-Language头
    pub accept_language: String,
}

/// 重试配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct RetrySettings {
    /// 总尝试次数上限（含首次）
    pub max_attempts: u32,
    /// 初始退避（毫秒）
    pub initial_backoff_ms: u64,
    /// 最大退避（毫秒）
    pub max_backoff_ms: u64,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子
    pub jitter_factor: f64,
}

/// 抽取配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionSettings {
    /// 价格上限（超过视为解析错误）
    pub max_price: u64,
    /// 商品图片数量上限
    pub max_images: usize,
    /// 描述最小长度（低于此长度的兜底描述被丢弃）
    pub min_description_length: usize,
    /// 链接密度阈值（每100字符的链接数）
    pub link_density_threshold: f64,
}

/// 商品落库配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct MaterializerSettings {
    /// slug冲突重试上限
    pub slug_max_attempts: u32,
    /// 单张图片下载超时（秒）
    pub image_timeout_secs: u64,
    /// 抽取成功后是否自动创建商品草稿
    pub auto_materialize: bool,
}

/// 工作器配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct WorkerSettings {
    /// 工作器数量
    pub count: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default fetch settings
            .set_default("fetch.timeout_secs", 30)?
            .set_default("fetch.use_proxy", false)?
            .set_default("fetch.min_content_length", 500)?
            .set_default("fetch.browser_fallback", true)?
            .set_default("fetch.circuit_failure_threshold", 5)?
            .set_default("fetch.circuit_recovery_secs", 30)?
            .set_default(
                "fetch.accept_language",
                "fa-IR,fa;q=0.9,en-US;q=0.7,en;q=0.5",
            )?
            // Default retry settings
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.initial_backoff_ms", 1000)?
            .set_default("retry.max_backoff_ms", 30000)?
            .set_default("retry.backoff_multiplier", 2.0)?
            .set_default("retry.jitter_factor", 0.1)?
            // Default extraction settings
            .set_default("extraction.max_price", 10_000_000_000u64)?
            .set_default("extraction.max_images", 20)?
            .set_default("extraction.min_description_length", 150)?
            .set_default("extraction.link_density_threshold", 1.0)?
            // Default materializer settings
            .set_default("materializer.slug_max_attempts", 5)?
            .set_default("materializer.image_timeout_secs", 15)?
            .set_default("materializer.auto_materialize", true)?
            // Default worker settings
            .set_default("worker.count", 4)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("EXTRACTRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
