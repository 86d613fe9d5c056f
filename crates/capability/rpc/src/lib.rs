//! 与后端之间的持久化 RPC 通道。
//!
//! - [`MqttChannelClient`]：MQTT 上的请求/响应关联，后台任务负责自动重连
//! - [`ConnectionState`]：显式连接状态机，经 `watch` 广播
//! - [`RpcCaller`]：同步调度依赖的调用抽象（测试可替换）

pub mod client;
pub mod error;
pub mod pending;
pub mod reply;
pub mod types;

pub use client::{MqttChannelClient, MqttChannelConfig};
pub use error::RpcError;
pub use pending::PendingCalls;
pub use types::*;

use async_trait::async_trait;
use tokio::sync::watch;

/// RPC 调用抽象。
#[async_trait]
pub trait RpcCaller: Send + Sync {
    /// 调用后端动作，等待同 id 的响应。
    async fn call(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<RpcResponse, RpcError>;

    /// 当前连接状态。
    fn state(&self) -> ConnectionState;

    /// 订阅连接状态变化。
    fn subscribe_state(&self) -> watch::Receiver<ConnectionState>;
}
