use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 分摊请求: 付款人列表 + 每个明细由哪些付款人分摊
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplitRequest {
    pub payers: Vec<String>,
    pub assignments: Vec<ItemAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemAssignment {
    pub item_index: usize,
    pub payers: Vec<usize>,
}

/// 单个付款人的应付金额
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayerShare {
    pub name: String,
    pub amount: BigDecimal,
}
