use super::totals::round2;
use crate::models::{PayerShare, ReconciledItem, SplitRequest};
use bigdecimal::{BigDecimal, Zero};
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("Item index {0} is out of range")]
    UnknownItem(usize),
    #[error("Payer index {0} is out of range")]
    UnknownPayer(usize),
}

/// 付款人显示名, 空白时为 "Friend N"
pub fn payer_name(payers: &[String], index: usize) -> String {
    match payers.get(index).map(|name| name.trim()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Friend {}", index + 1),
    }
}

/// 按勾选关系平摊每个明细的金额
///
/// 结果按付款人首次出现的顺序排列, 同名付款人合并。
pub fn split_items(items: &[ReconciledItem], request: &SplitRequest) -> Result<Vec<PayerShare>, SplitError> {
    let mut totals: IndexMap<String, BigDecimal> = IndexMap::new();

    for assignment in &request.assignments {
        let item = items
            .get(assignment.item_index)
            .ok_or(SplitError::UnknownItem(assignment.item_index))?;

        let selected: IndexSet<usize> = assignment.payers.iter().copied().collect();
        if let Some(&bad) = selected.iter().find(|&&p| p >= request.payers.len()) {
            return Err(SplitError::UnknownPayer(bad));
        }
        if selected.is_empty() {
            continue;
        }

        let share = &item.total_price / BigDecimal::from(selected.len() as u64);
        for &payer in &selected {
            let entry = totals
                .entry(payer_name(&request.payers, payer))
                .or_insert_with(BigDecimal::zero);
            *entry = &*entry + &share;
        }
    }

    Ok(totals
        .into_iter()
        .map(|(name, amount)| PayerShare {
            name,
            amount: round2(&amount),
        })
        .collect())
}
