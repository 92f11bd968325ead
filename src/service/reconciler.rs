//! 小票明细对账
//!
//! 把识别服务返回的原始明细 (数量/单价/金额/描述, 各自可能缺失) 整理成
//! 算术一致的明细列表: 补全缺失值、识别税额行与折扣行、识别称重与
//! "N @ 单价" 描述, 并保证每行 `|totalPrice - quantity * price| <= 0.01`。
//!
//! 每一步都是 `LineDraft -> LineDraft` 的纯函数, 后一步可以覆盖前一步的
//! 结果, 执行顺序见 [`reconcile_item`]。

use super::patterns;
use super::totals::round2;
use crate::models::{ItemKind, RawExtractedItem, ReconciledItem};
use bigdecimal::{BigDecimal, One, Zero};
use once_cell::sync::Lazy;
use std::str::FromStr;

/// 允许的行金额误差
static TOLERANCE: Lazy<BigDecimal> = Lazy::new(|| BigDecimal::from_str("0.01").expect("tolerance"));

/// 对账上下文: 小票级的税额和折扣
#[derive(Debug, Clone)]
pub struct Adjustments {
    pub tax: BigDecimal,
    pub discount: BigDecimal,
}

impl Adjustments {
    pub fn new(tax: BigDecimal, discount: BigDecimal) -> Self {
        Self { tax, discount }
    }
}

/// 对账过程中的中间值
#[derive(Debug, Clone, PartialEq)]
pub struct LineDraft {
    pub index: usize,
    pub description: String,
    pub quantity: BigDecimal,
    pub price: BigDecimal,
    pub total: BigDecimal,
    pub is_weighted: bool,
}

impl LineDraft {
    pub fn kind(&self) -> ItemKind {
        patterns::classify(&self.description)
    }
}

/// 对账入口: 原始明细 + 税额 + 折扣 -> 过滤后的明细
pub fn reconcile(
    raw_items: &[RawExtractedItem],
    tax: &BigDecimal,
    discount: &BigDecimal,
) -> Vec<ReconciledItem> {
    let adjustments = Adjustments::new(tax.clone(), discount.clone());

    let items: Vec<ReconciledItem> = raw_items
        .iter()
        .map(|raw| reconcile_item(raw, &adjustments))
        .filter(keep_item)
        .collect();

    tracing::debug!(
        "Reconciled {} raw items into {} items",
        raw_items.len(),
        items.len()
    );
    items
}

/// 单行对账, 步骤顺序不可调换
pub fn reconcile_item(raw: &RawExtractedItem, adjustments: &Adjustments) -> ReconciledItem {
    let draft = draft_from_raw(raw);
    let draft = name_unlabeled(draft);
    let draft = apply_weight(draft);
    let draft = apply_per_unit(draft);
    let draft = apply_tax(draft, &adjustments.tax);
    let draft = apply_discount(draft, &adjustments.discount);
    let draft = backfill_missing(draft);
    let draft = enforce_consistency(draft);
    let draft = round_fields(draft);
    let draft = settle_rounding(draft);
    finish(draft)
}

/// 税额/折扣变更后重算对应的伪明细行, 普通商品行原样保留
///
/// 折扣行丢弃旧的单价和金额, 由新折扣额重新推导。
pub fn refresh_adjustments(
    items: &[ReconciledItem],
    tax: &BigDecimal,
    discount: &BigDecimal,
) -> Vec<ReconciledItem> {
    let adjustments = Adjustments::new(tax.clone(), discount.clone());

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item.kind() {
            ItemKind::Regular => item.clone(),
            ItemKind::Tax => reconcile_item(&item.to_raw(i), &adjustments),
            ItemKind::Discount => {
                let raw = RawExtractedItem {
                    price_hint: None,
                    total_hint: None,
                    ..item.to_raw(i)
                };
                reconcile_item(&raw, &adjustments)
            }
        })
        .filter(keep_item)
        .collect()
}

/// 金额为0的行丢弃, 税额行除外
pub fn keep_item(item: &ReconciledItem) -> bool {
    !item.total_price.is_zero() || item.kind() == ItemKind::Tax
}

/// 1. 缺省值: 数量缺失为1, 单价/金额缺失为0, 描述去空白
pub fn draft_from_raw(raw: &RawExtractedItem) -> LineDraft {
    LineDraft {
        index: raw.index,
        description: raw
            .description_hint
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        quantity: raw.quantity_hint.clone().unwrap_or_else(BigDecimal::one),
        price: raw.price_hint.clone().unwrap_or_else(BigDecimal::zero),
        total: raw.total_hint.clone().unwrap_or_else(BigDecimal::zero),
        is_weighted: false,
    }
}

/// 2. 无描述时生成 "Item N" / "Item N ($x.xx)"
pub fn name_unlabeled(draft: LineDraft) -> LineDraft {
    if !draft.description.is_empty() {
        return draft;
    }

    let description = if draft.total.is_zero() {
        format!("Item {}", draft.index + 1)
    } else {
        format!("Item {} (${})", draft.index + 1, round2(&draft.total))
    };
    LineDraft { description, ..draft }
}

/// 3. 称重描述: 数量取重量, 单价缺失时由金额反推
pub fn apply_weight(draft: LineDraft) -> LineDraft {
    let Some(weight) = patterns::weight(&draft.description) else {
        return draft;
    };

    tracing::trace!(
        "Item {} weighed {} {}",
        draft.index + 1,
        weight.amount,
        weight.unit.symbol()
    );

    let quantity = weight.amount;
    let price = if draft.price.is_zero() && !draft.total.is_zero() && !quantity.is_zero() {
        &draft.total / &quantity
    } else {
        draft.price.clone()
    };

    LineDraft {
        quantity,
        price,
        is_weighted: true,
        ..draft
    }
}

/// 4. "N @ 单价" 描述: 无条件覆盖数量和单价 (优先于称重)
pub fn apply_per_unit(draft: LineDraft) -> LineDraft {
    match patterns::per_unit(&draft.description) {
        Some(m) => LineDraft {
            quantity: m.quantity,
            price: m.unit_price,
            ..draft
        },
        None => draft,
    }
}

/// 5. 税额行: 数量1, 单价=金额=税额
pub fn apply_tax(draft: LineDraft, tax: &BigDecimal) -> LineDraft {
    if draft.kind() != ItemKind::Tax {
        return draft;
    }
    LineDraft {
        quantity: BigDecimal::one(),
        price: tax.clone(),
        total: tax.clone(),
        ..draft
    }
}

/// 6. 折扣行: 数量1, 金额 = -|折扣|, 单价取负 (数量*单价 <= 0)
pub fn apply_discount(draft: LineDraft, discount: &BigDecimal) -> LineDraft {
    if draft.kind() != ItemKind::Discount {
        return draft;
    }
    LineDraft {
        quantity: BigDecimal::one(),
        price: -draft.price.abs(),
        total: -discount.abs(),
        ..draft
    }
}

/// 7. 有金额但缺数量或单价时补全
pub fn backfill_missing(draft: LineDraft) -> LineDraft {
    if draft.total.is_zero() || !(draft.quantity.is_zero() || draft.price.is_zero()) {
        return draft;
    }

    if draft.quantity.is_zero() && !draft.price.is_zero() {
        let quantity = &draft.total / &draft.price;
        LineDraft { quantity, ..draft }
    } else if draft.price.is_zero() && !draft.quantity.is_zero() {
        let price = &draft.total / &draft.quantity;
        LineDraft { price, ..draft }
    } else {
        LineDraft {
            quantity: BigDecimal::one(),
            price: draft.total.clone(),
            ..draft
        }
    }
}

/// 8. 金额与 数量*单价 相差超过0.01时, 以 数量*单价 为准
pub fn enforce_consistency(draft: LineDraft) -> LineDraft {
    let expected = &draft.quantity * &draft.price;
    if (&draft.total - &expected).abs() > *TOLERANCE {
        LineDraft {
            total: expected,
            ..draft
        }
    } else {
        draft
    }
}

/// 9. 三个数值字段各自保留两位小数
pub fn round_fields(draft: LineDraft) -> LineDraft {
    LineDraft {
        quantity: round2(&draft.quantity),
        price: round2(&draft.price),
        total: round2(&draft.total),
        ..draft
    }
}

/// 10. 舍入后单价误差被数量放大时, 金额改为 round2(数量*单价)
pub fn settle_rounding(draft: LineDraft) -> LineDraft {
    let expected = round2(&(&draft.quantity * &draft.price));
    if (&draft.total - &expected).abs() > *TOLERANCE {
        LineDraft {
            total: expected,
            ..draft
        }
    } else {
        draft
    }
}

fn finish(draft: LineDraft) -> ReconciledItem {
    ReconciledItem {
        description: draft.description,
        quantity: draft.quantity,
        price: draft.price,
        total_price: draft.total,
        is_weighted: draft.is_weighted,
    }
}
