use super::AppState;
use crate::error::AppError;
use crate::models::{PayerShare, Receipt, ReceiptUpdate, SplitRequest};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// 请求体: base64 编码的小票图片
#[derive(Debug, Deserialize)]
pub struct ProcessReceiptRequest {
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 分摊结果
#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub receipt_id: i64,
    pub shares: Vec<PayerShare>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传并识别小票
pub async fn process_receipt(
    State(state): State<AppState>,
    Json(req): Json<ProcessReceiptRequest>,
) -> Result<(StatusCode, Json<Receipt>), AppError> {
    tracing::info!("Received request to process receipt");

    let encoded = req
        .image
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No image data received".to_string()))?;

    let image = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid image data: {}", e)))?;

    let receipt = state.receipts.process_receipt(&image).await?;
    Ok((StatusCode::OK, Json(receipt)))
}

/// 最近的小票列表
pub async fn list_receipts(State(state): State<AppState>) -> Result<Json<Vec<Receipt>>, AppError> {
    Ok(Json(state.receipts.list_receipts().await?))
}

/// 修改明细 / 税额 / 折扣
pub async fn update_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<ReceiptUpdate>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(state.receipts.update_receipt(id, update).await?))
}

pub async fn delete_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.receipts.delete_receipt(id).await?;
    Ok(Json(MessageResponse {
        message: "Receipt deleted successfully".to_string(),
    }))
}

/// 多人分摊
pub async fn split_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SplitRequest>,
) -> Result<Json<SplitResponse>, AppError> {
    let shares = state.receipts.split_receipt(id, &req).await?;
    Ok(Json(SplitResponse { receipt_id: id, shares }))
}
