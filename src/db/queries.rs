use crate::models::{NewReceipt, Receipt, ReceiptChanges, ReconciledItem, RECEIPT_TYPE};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::time::{Duration, Instant};

const RECEIPT_COLUMNS: &str =
    "id, record_type, name, date, total, items, tax, discount, created_at, updated_at";

/// receipts 表的一行
#[derive(Debug, FromRow)]
pub struct ReceiptRow {
    pub id: i64,
    pub record_type: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub total: BigDecimal,
    pub items: Json<Vec<ReconciledItem>>,
    pub tax: BigDecimal,
    pub discount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        Receipt {
            id: row.id,
            record_type: row.record_type,
            name: row.name,
            date: row.date,
            total: row.total,
            items: row.items.0,
            tax: row.tax,
            discount: row.discount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// 新增小票
pub async fn insert_receipt(pool: &PgPool, receipt: &NewReceipt) -> Result<Receipt, sqlx::Error> {
    let sql = format!(
        "INSERT INTO receipts (record_type, name, date, total, items, tax, discount)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {RECEIPT_COLUMNS}"
    );

    let start_time = Instant::now();

    // 添加超时控制: 30秒
    let result = tokio::time::timeout(
        Duration::from_secs(30),
        sqlx::query_as::<_, ReceiptRow>(&sql)
            .bind(RECEIPT_TYPE)
            .bind(&receipt.name)
            .bind(receipt.date)
            .bind(&receipt.total)
            .bind(Json(&receipt.items))
            .bind(&receipt.tax)
            .bind(&receipt.discount)
            .fetch_one(pool),
    )
    .await;

    match result {
        Ok(Ok(row)) => {
            tracing::info!("Receipt {} inserted, {} items, took {:?}", row.id, receipt.items.len(), start_time.elapsed());
            Ok(row.into())
        }
        Ok(Err(e)) => {
            tracing::error!("Receipt insert failed after {:?}: {:?}", start_time.elapsed(), e);
            Err(e)
        }
        Err(_) => {
            tracing::error!("Receipt insert timed out (>30s)");
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

/// 按ID查询
pub async fn get_receipt(pool: &PgPool, id: i64) -> Result<Option<Receipt>, sqlx::Error> {
    let sql = format!("SELECT {RECEIPT_COLUMNS} FROM receipts WHERE id = $1");
    let row = sqlx::query_as::<_, ReceiptRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Receipt::from))
}

/// 最近的小票 (按交易时间倒序)
pub async fn list_recent_receipts(pool: &PgPool, limit: i64) -> Result<Vec<Receipt>, sqlx::Error> {
    let sql = format!("SELECT {RECEIPT_COLUMNS} FROM receipts ORDER BY date DESC, id DESC LIMIT $1");
    let rows = sqlx::query_as::<_, ReceiptRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Receipt::from).collect())
}

/// 写回明细、总额、税额、折扣; 不存在时返回 None
pub async fn update_receipt(
    pool: &PgPool,
    id: i64,
    changes: &ReceiptChanges,
) -> Result<Option<Receipt>, sqlx::Error> {
    let sql = format!(
        "UPDATE receipts
         SET items = $2, total = $3, tax = $4, discount = $5, updated_at = now()
         WHERE id = $1
         RETURNING {RECEIPT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, ReceiptRow>(&sql)
        .bind(id)
        .bind(Json(&changes.items))
        .bind(&changes.total)
        .bind(&changes.tax)
        .bind(&changes.discount)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Receipt::from))
}

/// 删除; 返回是否存在
pub async fn delete_receipt(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM receipts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
