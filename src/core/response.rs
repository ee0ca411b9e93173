//! 核心响应处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 创建成功响应：201 + 新资源 id
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: String,
}

impl Created {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

impl IntoResponse for Created {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}
