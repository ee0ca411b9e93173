//! 核心中间件模块

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求日志中间件
///
/// 沿用客户端提供的 `x-request-id`，没有时生成一个，并在响应中回写。
pub async fn request_logging_middleware(mut req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });
    req.headers_mut().insert(
        HeaderName::from_static(REQUEST_ID_HEADER),
        request_id.clone(),
    );

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.to_str().unwrap_or("invalid")
    );
    let mut response = next.run(req).instrument(span.clone()).await;

    info!(
        parent: &span,
        "{} {} - {} - {}ms",
        method,
        uri,
        response.status(),
        start.elapsed().as_millis()
    );

    response
        .headers_mut()
        .insert(HeaderName::from_static(REQUEST_ID_HEADER), request_id);
    response
}
