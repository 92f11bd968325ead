use super::ReconciledItem;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RECEIPT_TYPE: &str = "receipt";
pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

/// 小票 (持久化聚合)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: i64,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,                  // 商户名称
    pub date: DateTime<Utc>,           // 交易时间
    pub total: BigDecimal,
    pub items: Vec<ReconciledItem>,
    pub tax: BigDecimal,
    pub discount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待创建的小票 (无ID、无时间戳)
#[derive(Debug, Clone, PartialEq)]
pub struct NewReceipt {
    pub name: String,
    pub date: DateTime<Utc>,
    pub total: BigDecimal,
    pub items: Vec<ReconciledItem>,
    pub tax: BigDecimal,
    pub discount: BigDecimal,
}

/// 部分更新请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiptUpdate {
    pub items: Option<Vec<ReconciledItem>>,
    pub total: Option<BigDecimal>,
    pub tax: Option<BigDecimal>,
    pub discount: Option<BigDecimal>,
}

/// 合并后写回存储的完整字段
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptChanges {
    pub items: Vec<ReconciledItem>,
    pub total: BigDecimal,
    pub tax: BigDecimal,
    pub discount: BigDecimal,
}
