//! 认证网关对 RADIUS 守护进程暴露的 DTO 与响应契约。

use domain::NetworkDevice;
use serde::{Deserialize, Serialize};

/// 失败响应封装（只携带稳定错误码，不回传内部错误文本）。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 守护进程 REST 模块发来的 Access-Request。
#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    pub request: AccessRequestAttributes,
}

/// Access-Request 属性（只有 `User-Name` 参与查询，其余用于日志）。
#[derive(Default, Deserialize)]
pub struct AccessRequestAttributes {
    #[serde(rename = "User-Name", default)]
    pub user_name: String,
    #[serde(rename = "User-Password", default)]
    pub user_password: Option<String>,
    #[serde(rename = "Calling-Station-Id", default)]
    pub calling_station_id: Option<String>,
    #[serde(rename = "Service-Type", default)]
    pub service_type: Option<String>,
    #[serde(rename = "NAS-Identifier", default)]
    pub nas_identifier: Option<String>,
    /// 守护进程可能以数字或字符串下发
    #[serde(rename = "NAS-Port", default)]
    pub nas_port: Option<serde_json::Value>,
    #[serde(rename = "NAS-Port-Type", default)]
    pub nas_port_type: Option<String>,
    #[serde(rename = "NAS-Port-Id", default)]
    pub nas_port_id: Option<String>,
    #[serde(rename = "Packet-Type", default)]
    pub packet_type: Option<String>,
    #[serde(rename = "Vendor-Specific", default)]
    pub vendor_specific: Option<serde_json::Value>,
    #[serde(rename = "Net", default)]
    pub net: Option<PacketNet>,
}

impl std::fmt::Debug for AccessRequestAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessRequestAttributes")
            .field("user_name", &self.user_name)
            .field("calling_station_id", &self.calling_station_id)
            .field("nas_identifier", &self.nas_identifier)
            .field("nas_port_id", &self.nas_port_id)
            .field("packet_type", &self.packet_type)
            .finish_non_exhaustive()
    }
}

/// 报文的网络五元组信息。
#[derive(Debug, Default, Deserialize)]
pub struct PacketNet {
    #[serde(rename = "Src", default)]
    pub src: Option<PacketEndpoint>,
    #[serde(rename = "Dst", default)]
    pub dst: Option<PacketEndpoint>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PacketEndpoint {
    #[serde(rename = "IP", default)]
    pub ip: Option<String>,
    #[serde(rename = "Port", default)]
    pub port: Option<u16>,
}

/// `GET /client/{ip}` 返回的 NAS 视图。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NasView {
    pub id: String,
    /// 客户端查询时使用的地址
    pub ip: String,
    pub name: String,
    pub secret: String,
}

impl NasView {
    pub fn from_device(device: &NetworkDevice, queried_ip: &str) -> Self {
        Self {
            id: device.id.clone(),
            ip: queried_ip.to_string(),
            name: device.name.clone(),
            secret: device.radius_secret.clone(),
        }
    }
}
