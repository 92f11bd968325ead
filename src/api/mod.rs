pub mod handlers;

use crate::service::ReceiptService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

pub use handlers::*;

/// 上传图片为 base64, 放宽请求体上限
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub receipts: Arc<ReceiptService>,
}

impl AppState {
    pub fn new(receipts: Arc<ReceiptService>) -> Self {
        Self { receipts }
    }
}

pub fn router(state: AppState) -> Router {
    let receipt_routes = Router::new()
        .route("/", get(handlers::list_receipts))
        .route("/process-receipt", post(handlers::process_receipt))
        .route("/:id", put(handlers::update_receipt).delete(handlers::delete_receipt))
        .route("/:id/split", post(handlers::split_receipt));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/receipts", receipt_routes)
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(MAX_BODY_BYTES)))
        .with_state(state)
}
