//! 产品处理器

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::{
    model::{Product, ProductQuery, Review},
    service::ProductService,
    validator::{trigger_bad_request, validate_product, validate_review},
};
use crate::core::{
    error::{ApiError, ApiResult},
    response::Created,
};
use crate::AppState;

/// 服务层是同步的整文件读写，放到阻塞线程池执行，避免占用 tokio 工作线程
pub(crate) async fn blocking<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&ProductService) -> ApiResult<T> + Send + 'static,
{
    let service = state.products.clone();
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
}

/// 把 JSON 解析失败统一成 400
fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Created> {
    let payload = json_body(body)?;
    let violations = validate_product(&payload);
    let payload = trigger_bad_request(payload, violations)?;

    let id = blocking(&state, move |products| products.create_product(payload)).await?;
    Ok(Created::new(id))
}

pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Vec<Product>>> {
    // 查询参数不做校验：无法解析时按不过滤处理
    let query = query
        .map(|Query(pairs)| ProductQuery::from_pairs(&pairs))
        .unwrap_or_default();

    let products = blocking(&state, move |products| products.list_products(&query)).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = blocking(&state, move |products| products.get_product(&id)).await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let payload = match json_body(body)? {
        Value::Object(object) => object,
        _ => return Err(ApiError::BadRequest("Request body must be a JSON object!".to_string())),
    };

    let product = blocking(&state, move |products| products.update_product(&id, payload)).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    blocking(&state, move |products| products.delete_product(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Created> {
    let payload = json_body(body)?;
    let violations = validate_review(&payload);
    let payload = trigger_bad_request(payload, violations)?;

    let review_id = blocking(&state, move |products| products.create_review(&id, payload)).await?;
    Ok(Created::new(review_id))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Review>>> {
    let reviews = blocking(&state, move |products| products.list_reviews(&id)).await?;
    Ok(Json(reviews))
}
