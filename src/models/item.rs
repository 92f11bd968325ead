use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 识别服务返回的原始明细行 (各字段均可能缺失)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtractedItem {
    pub index: usize,                          // 在原始列表中的位置 (从0开始)
    pub quantity_hint: Option<BigDecimal>,     // 数量
    pub price_hint: Option<BigDecimal>,        // 单价
    pub total_hint: Option<BigDecimal>,        // 行金额
    pub description_hint: Option<String>,      // 商品描述
}

impl RawExtractedItem {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description_hint = Some(description.into());
        self
    }

    pub fn with_quantity(mut self, quantity: BigDecimal) -> Self {
        self.quantity_hint = Some(quantity);
        self
    }

    pub fn with_price(mut self, price: BigDecimal) -> Self {
        self.price_hint = Some(price);
        self
    }

    pub fn with_total(mut self, total: BigDecimal) -> Self {
        self.total_hint = Some(total);
        self
    }
}

/// 对账后的明细行 (持久化)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledItem {
    pub description: String,
    pub quantity: BigDecimal,
    pub price: BigDecimal,
    pub total_price: BigDecimal,
    #[serde(default)]
    pub is_weighted: bool,
}

impl ReconciledItem {
    pub fn kind(&self) -> ItemKind {
        ItemKind::classify(&self.description)
    }

    /// 把已对账的明细重新作为识别结果输入
    pub fn to_raw(&self, index: usize) -> RawExtractedItem {
        RawExtractedItem {
            index,
            quantity_hint: Some(self.quantity.clone()),
            price_hint: Some(self.price.clone()),
            total_hint: Some(self.total_price.clone()),
            description_hint: Some(self.description.clone()),
        }
    }
}

/// 明细行分类: 普通商品 / 税额行 / 折扣行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Regular,
    Tax,
    Discount,
}

impl ItemKind {
    /// 按规范化描述 (去空白、忽略大小写) 分类
    pub fn classify(description: &str) -> Self {
        let normalized = description.trim();
        if normalized.eq_ignore_ascii_case("TAX") {
            ItemKind::Tax
        } else if normalized.eq_ignore_ascii_case("DISCOUNT") {
            ItemKind::Discount
        } else {
            ItemKind::Regular
        }
    }
}
