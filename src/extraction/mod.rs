pub mod azure;

use crate::models::RawExtractedItem;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use thiserror::Error;

pub use azure::AzureReceiptExtractor;

/// 识别服务错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Receipt analysis timed out")]
    Timeout,

    #[error("No receipt data found.")]
    NoDocument,

    #[error("{0}")]
    Failed(String),

    #[error("Extraction request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// 识别结果: 小票级字段 + 原始明细
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedReceipt {
    pub merchant_name: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub total: Option<BigDecimal>,
    pub tax: Option<BigDecimal>,
    pub discount: Option<BigDecimal>,
    pub items: Vec<RawExtractedItem>,
}

/// 票据识别服务 (外部黑盒)
#[async_trait]
pub trait ReceiptExtractor: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> Result<ExtractedReceipt, ExtractionError>;
}
