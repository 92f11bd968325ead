use super::reconciler::{reconcile, refresh_adjustments};
use super::split::split_items;
use super::totals::{receipt_total, reprice_item};
use crate::db::ReceiptStore;
use crate::error::AppError;
use crate::extraction::ReceiptExtractor;
use crate::models::{
    NewReceipt, PayerShare, Receipt, ReceiptChanges, ReceiptUpdate, SplitRequest, UNKNOWN_MERCHANT,
};
use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use std::sync::Arc;

/// 列表接口返回的最大条数
pub const RECENT_LIMIT: usize = 20;

/// 小票服务: 识别 -> 对账 -> 存储, 以及后续的修改/删除/分摊
pub struct ReceiptService {
    extractor: Arc<dyn ReceiptExtractor>,
    store: Arc<dyn ReceiptStore>,
}

impl ReceiptService {
    pub fn new(extractor: Arc<dyn ReceiptExtractor>, store: Arc<dyn ReceiptStore>) -> Self {
        Self { extractor, store }
    }

    /// 处理一张小票图片, 成功后才落库
    pub async fn process_receipt(&self, image: &[u8]) -> Result<Receipt, AppError> {
        let extracted = self.extractor.analyze(image).await?;

        let tax = extracted.tax.unwrap_or_else(BigDecimal::zero);
        let discount = extracted.discount.unwrap_or_else(BigDecimal::zero);
        let items = reconcile(&extracted.items, &tax, &discount);
        let total = receipt_total(&items, &tax, &discount);

        if let Some(printed) = &extracted.total {
            if printed != &total {
                tracing::info!("Printed total {} differs from computed total {}, using computed", printed, total);
            }
        }

        let receipt = NewReceipt {
            name: extracted
                .merchant_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
            date: extracted
                .transaction_date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
                .unwrap_or_else(Utc::now),
            total,
            items,
            tax,
            discount,
        };

        let saved = self.store.create(receipt).await?;
        tracing::info!(
            "Receipt {} saved: {} ({} items, total {})",
            saved.id,
            saved.name,
            saved.items.len(),
            saved.total
        );
        Ok(saved)
    }

    pub async fn list_receipts(&self) -> Result<Vec<Receipt>, AppError> {
        self.store.list_recent(RECENT_LIMIT).await
    }

    pub async fn get_receipt(&self, id: i64) -> Result<Receipt, AppError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(AppError::receipt_not_found)
    }

    /// 部分更新; 明细按 数量*单价 重算, 税额/折扣行跟随新的税额和折扣,
    /// 总额始终由服务端重算
    pub async fn update_receipt(&self, id: i64, update: ReceiptUpdate) -> Result<Receipt, AppError> {
        let current = self.get_receipt(id).await?;

        let items: Vec<_> = match update.items {
            Some(items) => items.iter().map(reprice_item).collect(),
            None => current.items,
        };
        let tax = update.tax.unwrap_or(current.tax);
        let discount = update.discount.unwrap_or(current.discount);
        let items = refresh_adjustments(&items, &tax, &discount);
        let total = receipt_total(&items, &tax, &discount);

        if let Some(requested) = &update.total {
            if requested != &total {
                tracing::debug!("Receipt {}: requested total {} replaced by {}", id, requested, total);
            }
        }

        let changes = ReceiptChanges {
            items,
            total,
            tax,
            discount,
        };
        self.store
            .update(id, changes)
            .await?
            .ok_or_else(AppError::receipt_not_found)
    }

    pub async fn delete_receipt(&self, id: i64) -> Result<(), AppError> {
        if self.store.delete(id).await? {
            tracing::info!("Receipt {} deleted", id);
            Ok(())
        } else {
            Err(AppError::receipt_not_found())
        }
    }

    pub async fn split_receipt(&self, id: i64, request: &SplitRequest) -> Result<Vec<PayerShare>, AppError> {
        let receipt = self.get_receipt(id).await?;
        Ok(split_items(&receipt.items, request)?)
    }
}
