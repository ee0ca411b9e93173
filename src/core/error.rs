//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::app::products::validator::Violation;
use crate::infrastructure::store::StoreError;

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Errors during product validation")]
    Validation(Vec<Violation>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Product with id {0} not found!")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("{0}")]
    Upload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Vec<Violation>> for ApiError {
    fn from(violations: Vec<Violation>) -> Self {
        ApiError::Validation(violations)
    }
}

/// 错误响应结构
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, kind, user_message, violations) = match self {
            ApiError::Validation(violations) => {
                warn!(count = violations.len(), "请求校验失败");
                (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    message,
                    Some(violations),
                )
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message, None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
            ApiError::Storage(e) => {
                error!("存储错误: {}", e);
                let kind = if e.is_read() {
                    "STORAGE_READ_ERROR"
                } else {
                    "STORAGE_WRITE_ERROR"
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    kind,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::Internal(detail) => {
                error!("内部错误: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::Upload(_) => {
                warn!("上传失败: {}", message);
                (StatusCode::BAD_REQUEST, "UPLOAD_ERROR", message, None)
            }
        };

        let error_response = ErrorResponse {
            error: kind.to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            violations,
        };

        (status, Json(error_response)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
