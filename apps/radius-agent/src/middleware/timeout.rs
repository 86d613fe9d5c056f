use axum::{
    BoxError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

/// 超时层的错误出口：超时写 503 `timed out`，handler future 已被丢弃。
pub async fn handle_timeout_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        agent_telemetry::record_timeout();
        debug!(target: "radius.http", "request_timed_out");
        return (StatusCode::SERVICE_UNAVAILABLE, "timed out").into_response();
    }
    error!(target: "radius.http", error = %err, "middleware_failed");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
