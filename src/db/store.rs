use super::queries;
use crate::error::AppError;
use crate::models::{NewReceipt, Receipt, ReceiptChanges, RECEIPT_TYPE};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::atomic::{AtomicI64, Ordering};

/// 小票存储 (按ID增删改查)
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn create(&self, receipt: NewReceipt) -> Result<Receipt, AppError>;
    async fn find(&self, id: i64) -> Result<Option<Receipt>, AppError>;
    async fn list_recent(&self, limit: usize) -> Result<Vec<Receipt>, AppError>;
    async fn update(&self, id: i64, changes: ReceiptChanges) -> Result<Option<Receipt>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// PostgreSQL 存储
pub struct PgReceiptStore {
    pool: PgPool,
}

impl PgReceiptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReceiptStore for PgReceiptStore {
    async fn create(&self, receipt: NewReceipt) -> Result<Receipt, AppError> {
        Ok(queries::insert_receipt(&self.pool, &receipt).await?)
    }

    async fn find(&self, id: i64) -> Result<Option<Receipt>, AppError> {
        Ok(queries::get_receipt(&self.pool, id).await?)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Receipt>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(queries::list_recent_receipts(&self.pool, limit).await?)
    }

    async fn update(&self, id: i64, changes: ReceiptChanges) -> Result<Option<Receipt>, AppError> {
        Ok(queries::update_receipt(&self.pool, id, &changes).await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(queries::delete_receipt(&self.pool, id).await?)
    }
}

/// 内存存储 (本地调试 / 测试)
pub struct MemoryReceiptStore {
    receipts: DashMap<i64, Receipt>,
    next_id: AtomicI64,
}

impl MemoryReceiptStore {
    pub fn new() -> Self {
        Self {
            receipts: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}

impl Default for MemoryReceiptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiptStore for MemoryReceiptStore {
    async fn create(&self, receipt: NewReceipt) -> Result<Receipt, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let stored = Receipt {
            id,
            record_type: RECEIPT_TYPE.to_string(),
            name: receipt.name,
            date: receipt.date,
            total: receipt.total,
            items: receipt.items,
            tax: receipt.tax,
            discount: receipt.discount,
            created_at: now,
            updated_at: now,
        };
        self.receipts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: i64) -> Result<Option<Receipt>, AppError> {
        Ok(self.receipts.get(&id).map(|r| r.value().clone()))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Receipt>, AppError> {
        let mut receipts: Vec<Receipt> = self.receipts.iter().map(|r| r.value().clone()).collect();
        receipts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        receipts.truncate(limit);
        Ok(receipts)
    }

    async fn update(&self, id: i64, changes: ReceiptChanges) -> Result<Option<Receipt>, AppError> {
        let Some(mut entry) = self.receipts.get_mut(&id) else {
            return Ok(None);
        };
        let receipt = entry.value_mut();
        receipt.items = changes.items;
        receipt.total = changes.total;
        receipt.tax = changes.tax;
        receipt.discount = changes.discount;
        receipt.updated_at = Utc::now();
        Ok(Some(receipt.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.receipts.remove(&id).is_some())
    }
}
