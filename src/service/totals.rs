use crate::models::{ItemKind, ReconciledItem};
use bigdecimal::{BigDecimal, Zero};

/// 保留两位小数 (四舍五入, 远离零方向)
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.round(2).with_scale(2)
}

/// 小票总额 = round2(普通明细合计) + 税额 - |折扣|
///
/// 税额行和折扣行已由标量 tax/discount 计入, 不再重复累加。
pub fn receipt_total(items: &[ReconciledItem], tax: &BigDecimal, discount: &BigDecimal) -> BigDecimal {
    let subtotal = items
        .iter()
        .filter(|item| item.kind() == ItemKind::Regular)
        .fold(BigDecimal::zero(), |acc, item| acc + &item.total_price);

    round2(&(round2(&subtotal) + tax - discount.abs()))
}

/// 用户修改数量/单价后重新计算行金额
pub fn reprice_item(item: &ReconciledItem) -> ReconciledItem {
    let quantity = round2(&item.quantity);
    let price = round2(&item.price);
    let total_price = round2(&(&quantity * &price));
    ReconciledItem {
        description: item.description.clone(),
        quantity,
        price,
        total_price,
        is_weighted: item.is_weighted,
    }
}
