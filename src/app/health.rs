//! 健康检查

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::products::handler::blocking;
use crate::core::error::ApiResult;
use crate::AppState;

/// 产品文档可读时返回 healthy 和当前产品数量
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let count = blocking(&state, |products| products.count()).await?;

    Ok(Json(json!({
        "status": "healthy",
        "products": count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
