//! 通道类型与线格式。

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RpcError;

/// 拉取全部路由器。
pub const GET_ROUTERS: &str = "App\\Actions\\Radius\\GetRouters";
/// 拉取全部用户服务。
pub const GET_SERVICES: &str = "App\\Actions\\Radius\\GetServices";

/// 通道连接状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 后端响应信封；`result` 由调用方按动作解码。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl RpcResponse {
    /// 将 `result` 解码为具体类型。
    pub fn decode_result<T: DeserializeOwned>(&self) -> Result<T, RpcError> {
        T::deserialize(&self.result).map_err(|err| RpcError::Decode(err.to_string()))
    }
}

/// 请求帧：`{id, method, data}`。
#[derive(Debug, Serialize)]
pub struct RequestFrame<'a> {
    pub id: &'a str,
    pub method: &'a str,
    pub data: &'a serde_json::Value,
}

/// 响应帧：`{id, data}` 或 `{id, error}`。
#[derive(Debug, Deserialize)]
pub struct ReplyFrame {
    pub id: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 通道诊断事件。
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Connected { client_id: String },
    Disconnected { reason: String },
    /// 非响应主题上的推送
    Message { topic: String, payload: Vec<u8> },
}

/// 诊断事件观察者。
pub type ChannelObserver = Arc<dyn Fn(&ChannelEvent) + Send + Sync>;
