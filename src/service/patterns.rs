//! 商品描述中的文本模式识别 (称重 / 单价 / 税额 / 折扣)

use crate::models::ItemKind;
use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

static WEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(lb|oz|g)").expect("weight pattern"));

static PER_UNIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*@\s*(\d+(?:\.\d+)?)").expect("per-unit pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    Pound,
    Ounce,
    Gram,
}

impl WeightUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            WeightUnit::Pound => "lb",
            WeightUnit::Ounce => "oz",
            WeightUnit::Gram => "g",
        }
    }
}

/// 称重描述, 例如 "Bananas 2.5 lb"
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatch {
    pub amount: BigDecimal,
    pub unit: WeightUnit,
}

/// 显式单价描述, 例如 "3 @ 1.99"
#[derive(Debug, Clone, PartialEq)]
pub struct PerUnitMatch {
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
}

pub fn weight(description: &str) -> Option<WeightMatch> {
    let caps = WEIGHT_RE.captures(description)?;
    let amount = BigDecimal::from_str(&caps[1]).ok()?;
    let unit = match caps[2].to_ascii_lowercase().as_str() {
        "lb" => WeightUnit::Pound,
        "oz" => WeightUnit::Ounce,
        _ => WeightUnit::Gram,
    };
    Some(WeightMatch { amount, unit })
}

pub fn per_unit(description: &str) -> Option<PerUnitMatch> {
    let caps = PER_UNIT_RE.captures(description)?;
    Some(PerUnitMatch {
        quantity: BigDecimal::from_str(&caps[1]).ok()?,
        unit_price: BigDecimal::from_str(&caps[2]).ok()?,
    })
}

pub fn classify(description: &str) -> ItemKind {
    ItemKind::classify(description)
}
