//! # 产品目录服务
//!
//! 一个基于 Axum 的小型 HTTP 服务，提供：
//! - 产品的增删改查，数据整体保存在一个 JSON 文档中
//! - 嵌套在产品下的评论
//! - 产品图片上传
//!
//! 分层结构：`app` (处理器与业务服务)、`core` (错误、中间件、响应)、
//! `infrastructure` (配置、日志、存储)。

pub mod app;
pub mod core;
pub mod infrastructure;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{
    health,
    products::{handler as products, service::ProductService},
    uploads::{handler as uploads, service::UploadService},
};
use crate::infrastructure::{config::Config, store::ProductStore};

/// 处理器共享的应用状态
#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub uploads: UploadService,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn ProductStore>, config: &Config) -> Self {
        Self {
            products: ProductService::new(store),
            uploads: UploadService::new(config.storage.uploads_dir.clone()),
            max_upload_bytes: config.storage.max_upload_bytes,
            request_timeout: Duration::from_secs(config.http.timeout_seconds),
        }
    }
}

/// 对外暴露的端点，启动时打印
pub const ENDPOINTS: [(&str, &str); 9] = [
    ("POST", "/products/"),
    ("GET", "/products/"),
    ("GET", "/products/:id"),
    ("PUT", "/products/:id"),
    ("DELETE", "/products/:id"),
    ("POST", "/products/:id/reviews"),
    ("GET", "/products/:id/reviews"),
    ("POST", "/products/:id/image"),
    ("GET", "/health"),
];

/// 创建路由
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    let timeout = state.request_timeout;

    Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/products/:id/reviews",
            get(products::list_reviews).post(products::create_review),
        )
        .route("/products/:id/image", post(uploads::upload_image))
        .route("/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(
            crate::core::middleware::request_logging_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
