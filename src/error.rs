use crate::extraction::ExtractionError;
use crate::service::split::SplitError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str = "Receipt processing timed out. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// 识别服务超时, 用户可重试
    #[error("{}", TIMEOUT_MESSAGE)]
    ExtractionTimeout,

    #[error("Failed to process the receipt: {0}")]
    Extraction(ExtractionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// 启动阶段的 IO 失败 (绑定端口等)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn receipt_not_found() -> Self {
        AppError::NotFound("Receipt not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExtractionTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Extraction(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Timeout => AppError::ExtractionTimeout,
            other => AppError::Extraction(other),
        }
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_and_map_to_500() {
        let err: AppError = config::ConfigError::Message("missing endpoint".to_string()).into();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Configuration error: missing endpoint");
    }

    #[test]
    fn extraction_timeout_maps_to_504() {
        let err: AppError = ExtractionError::Timeout.into();
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);

        let err: AppError = ExtractionError::NoDocument.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_errors_are_500() {
        let err = AppError::Internal("Failed to bind 0.0.0.0:5001".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
