//! 单个缓存的刷新任务。
//!
//! 先完整解码响应结果，再按到达顺序逐条 upsert；
//! 解码失败时不触碰缓存，单条写入失败只记录并继续。

use std::sync::Arc;

use agent_rpc::{GET_ROUTERS, GET_SERVICES, RpcCaller, RpcError};
use agent_storage::{RouterStore, ServiceStore};
use agent_telemetry::{record_upsert_failure, record_upserted};
use domain::{NetworkDevice, SubscriberService};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::SyncError;

/// `GetRouters` 的结果。
#[derive(Debug, Deserialize)]
pub struct RoutersResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub routers: Vec<NetworkDevice>,
}

/// `GetServices` 的结果。
#[derive(Debug, Deserialize)]
pub struct ServicesResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub services: Vec<SubscriberService>,
}

/// 单次刷新统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub received: usize,
    pub upserted: usize,
    pub failed: usize,
}

impl RefreshStats {
    fn record(&mut self, ok: bool) {
        if ok {
            self.upserted += 1;
        } else {
            self.failed += 1;
            record_upsert_failure();
        }
    }
}

fn decode_error(err: RpcError) -> SyncError {
    match err {
        RpcError::Decode(message) => SyncError::Decode(message),
        other => SyncError::Rpc(other),
    }
}

/// 刷新路由器缓存。
pub async fn refresh_routers(
    rpc: Arc<dyn RpcCaller>,
    store: Arc<dyn RouterStore>,
) -> Result<RefreshStats, SyncError> {
    let response = rpc.call(GET_ROUTERS, serde_json::json!({})).await?;
    let result: RoutersResult = response.decode_result().map_err(decode_error)?;
    debug!(
        target: "radius.sync",
        status = %result.status,
        count = result.routers.len(),
        "routers_received"
    );

    let mut stats = RefreshStats {
        received: result.routers.len(),
        ..RefreshStats::default()
    };
    for device in &result.routers {
        let outcome = store.put_router(device).await;
        if let Err(err) = &outcome {
            warn!(
                target: "radius.sync",
                router_id = %device.id,
                key = %device.cache_key(),
                error = %err,
                "router_upsert_failed"
            );
        }
        stats.record(outcome.is_ok());
    }
    record_upserted(stats.upserted as u64);
    Ok(stats)
}

/// 刷新用户服务缓存。
pub async fn refresh_services(
    rpc: Arc<dyn RpcCaller>,
    store: Arc<dyn ServiceStore>,
) -> Result<RefreshStats, SyncError> {
    let response = rpc.call(GET_SERVICES, serde_json::json!({})).await?;
    let result: ServicesResult = response.decode_result().map_err(decode_error)?;
    debug!(
        target: "radius.sync",
        status = %result.status,
        count = result.services.len(),
        "services_received"
    );

    let mut stats = RefreshStats {
        received: result.services.len(),
        ..RefreshStats::default()
    };
    for service in &result.services {
        let outcome = store.put_service(service).await;
        if let Err(err) = &outcome {
            warn!(
                target: "radius.sync",
                service_id = %service.id,
                username = %service.username,
                error = %err,
                "service_upsert_failed"
            );
        }
        stats.record(outcome.is_ok());
    }
    record_upserted(stats.upserted as u64);
    Ok(stats)
}
