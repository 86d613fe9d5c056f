//! RADIUS 守护进程 REST 模块的回调接口
//!
//! - authorize：按 `User-Name` 查询用户服务缓存，返回回复属性文档
//! - client：按源地址查询 NAS 设备缓存，返回 NAS 视图
//!
//! 失败一律映射为 401/404，不向守护进程暴露内部错误。

use api_contract::{AccessRequest, NasView};
use agent_storage::StorageError;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info};

use crate::AppState;
use crate::utils::response::{not_found, unauthorized};

/// POST /authorize、POST /authenticate
pub async fn authorize(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        // 请求体超限保留 413
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return rejection.into_response();
        }
        Err(rejection) => {
            agent_telemetry::record_auth_miss();
            info!(target: "radius.http", error = %rejection, "access_request_unreadable");
            return unauthorized();
        }
    };

    let request: AccessRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            agent_telemetry::record_auth_miss();
            info!(target: "radius.http", error = %err, "access_request_malformed");
            return unauthorized();
        }
    };
    let attributes = request.request;
    debug!(target: "radius.http", request = ?attributes, "access_request_decoded");

    match state.services.get_service(&attributes.user_name).await {
        Ok(service) => {
            agent_telemetry::record_auth_hit();
            info!(
                target: "radius.http",
                username = %attributes.user_name,
                rules = service.radreply.len(),
                "access_request_accepted"
            );
            (StatusCode::OK, Json(service.reply_document())).into_response()
        }
        Err(StorageError::NotFound | StorageError::EmptyKey) => {
            agent_telemetry::record_auth_miss();
            info!(target: "radius.http", username = %attributes.user_name, "subscriber_unknown");
            unauthorized()
        }
        Err(err) => {
            agent_telemetry::record_auth_miss();
            error!(
                target: "radius.http",
                username = %attributes.user_name,
                error = %err,
                "service_cache_lookup_failed"
            );
            unauthorized()
        }
    }
}

/// GET /client/:ip
pub async fn client(State(state): State<AppState>, Path(ip): Path<String>) -> Response {
    match state.routers.get_router(&ip).await {
        Ok(device) => {
            agent_telemetry::record_client_hit();
            (StatusCode::OK, Json(NasView::from_device(&device, &ip))).into_response()
        }
        Err(StorageError::NotFound | StorageError::EmptyKey) => {
            agent_telemetry::record_client_miss();
            info!(target: "radius.http", ip = %ip, "nas_unknown");
            not_found()
        }
        Err(err) => {
            agent_telemetry::record_client_miss();
            error!(target: "radius.http", ip = %ip, error = %err, "router_cache_lookup_failed");
            not_found()
        }
    }
}
