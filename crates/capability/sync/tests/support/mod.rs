#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use agent_rpc::{ConnectionState, RpcCaller, RpcError, RpcResponse};
use agent_storage::{InMemoryRouterStore, RouterStore, StorageError};
use async_trait::async_trait;
use domain::NetworkDevice;
use tokio::sync::watch;

/// 可控的 RPC 替身：按动作返回预置结果，并统计调用次数。
pub struct FakeRpc {
    state: watch::Sender<ConnectionState>,
    replies: Mutex<HashMap<String, Result<serde_json::Value, RpcError>>>,
    calls: AtomicUsize,
}

impl FakeRpc {
    pub fn new(initial: ConnectionState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            replies: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reply(&self, action: &str, result: serde_json::Value) {
        self.replies
            .lock()
            .expect("lock")
            .insert(action.to_string(), Ok(result));
    }

    pub fn fail(&self, action: &str, err: RpcError) {
        self.replies
            .lock()
            .expect("lock")
            .insert(action.to_string(), Err(err));
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RpcCaller for FakeRpc {
    async fn call(
        &self,
        action: &str,
        _payload: serde_json::Value,
    ) -> Result<RpcResponse, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.state.borrow().is_connected() {
            return Err(RpcError::Channel("not connected".to_string()));
        }
        let reply = self
            .replies
            .lock()
            .expect("lock")
            .get(action)
            .cloned()
            .unwrap_or_else(|| Err(RpcError::Remote(format!("no reply for {action}"))));
        reply.map(|result| RpcResponse {
            action: action.to_string(),
            status: "success".to_string(),
            result,
        })
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

/// 写入即 panic 的路由器存储。
pub struct PanickingRouterStore;

#[async_trait]
impl RouterStore for PanickingRouterStore {
    async fn put_router(&self, _device: &NetworkDevice) -> Result<(), StorageError> {
        panic!("router store exploded");
    }

    async fn get_router(&self, _ip: &str) -> Result<NetworkDevice, StorageError> {
        Err(StorageError::NotFound)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Ok(0)
    }
}

/// 每次写入都延迟的路由器存储，用于拉长同步周期。
pub struct SlowRouterStore {
    inner: InMemoryRouterStore,
    delay: Duration,
}

impl SlowRouterStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryRouterStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl RouterStore for SlowRouterStore {
    async fn put_router(&self, device: &NetworkDevice) -> Result<(), StorageError> {
        tokio::time::sleep(self.delay).await;
        self.inner.put_router(device).await
    }

    async fn get_router(&self, ip: &str) -> Result<NetworkDevice, StorageError> {
        self.inner.get_router(ip).await
    }

    async fn count(&self) -> Result<u64, StorageError> {
        self.inner.count().await
    }
}

pub fn routers_result() -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "routers": [
            {"id": "r1", "name": "first", "ip": "10.0.0.1", "radius_ip": "100.64.0.1", "radius_secret": "a"},
            {"id": "r2", "name": "second", "ip": "10.0.0.2", "radius_ip": null, "radius_secret": "b"},
            {"id": "r1b", "name": "first-renamed", "ip": "10.0.0.9", "radius_ip": "100.64.0.1", "radius_secret": "c"}
        ]
    })
}

pub fn services_result() -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "services": [
            {
                "id": "s1",
                "username": "alice",
                "password": "pw",
                "radreply": [
                    {"attribute": "Mikrotik-Rate-Limit", "op": ":=", "value": "10M/10M"}
                ]
            }
        ]
    })
}
