//! HTTP 错误响应构造
//!
//! 网关对外只暴露状态码和固定错误码，内部错误细节只进日志。

use std::time::Duration;

use api_contract::ApiResponse;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// 认证失败（解码失败、未知用户、缓存故障）
pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error("AUTH.UNAUTHORIZED", "unauthorized")),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 限流响应，`Retry-After` 向上取整到秒
pub fn rate_limited(wait: Duration) -> Response {
    let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ApiResponse::<()>::error("RATE.LIMITED", "too many requests")),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(seconds.max(1)));
    response
}
