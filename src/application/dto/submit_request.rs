// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// 单任务提交请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitJobRequest {
    /// 目标商品页URL
    #[validate(url(message = "target url must be a valid absolute URL"))]
    pub url: String,
    /// 所属商家ID
    pub vendor_id: Uuid,
    /// 供应商ID（可选）
    pub supplier_id: Option<Uuid>,
    /// 所属批次ID（可选）
    pub batch_id: Option<Uuid>,
}

/// 批次提交请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitBatchRequest {
    /// 批次名称（可选）
    #[validate(length(max = 100, message = "batch name is too long"))]
    pub name: Option<String>,
    /// 所属商家ID
    pub vendor_id: Uuid,
    /// 供应商ID（可选）
    pub supplier_id: Option<Uuid>,
    /// 目标URL列表
    #[validate(length(min = 1, message = "a batch needs at least one url"))]
    pub urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_job_request() {
        let request = SubmitJobRequest {
            url: "https://shop.ir/product/42".to_string(),
            vendor_id: Uuid::new_v4(),
            supplier_id: None,
            batch_id: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let request = SubmitJobRequest {
            url: "not a url".to_string(),
            vendor_id: Uuid::new_v4(),
            supplier_id: None,
            batch_id: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let request = SubmitBatchRequest {
            name: None,
            vendor_id: Uuid::new_v4(),
            supplier_id: None,
            urls: Vec::new(),
        };
        assert!(request.validate().is_err());
    }
}
