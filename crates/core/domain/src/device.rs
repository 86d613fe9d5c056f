//! NAS 设备（路由器）记录。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{non_empty, nullable_string};

/// 后端下发的网络设备记录。
///
/// 缓存键由 [`NetworkDevice::cache_key`] 计算，不使用 `id`。
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDevice {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub point_of_presence_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub vendor_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    /// 管理地址
    #[serde(default, deserialize_with = "nullable_string")]
    pub ip: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub model: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub serial: String,
    /// RADIUS 报文的源地址（可选）
    #[serde(default)]
    pub radius_ip: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub radius_secret: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub authorization_type: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub accounting_type: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub external_identifiers: serde_json::Value,
}

impl NetworkDevice {
    /// 缓存键：优先 `radius_ip`，为空时回落到管理地址 `ip`。
    pub fn cache_key(&self) -> &str {
        non_empty(self.radius_ip.as_deref()).unwrap_or(self.ip.as_str())
    }
}

impl std::fmt::Debug for NetworkDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkDevice")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("ip", &self.ip)
            .field("radius_ip", &self.radius_ip)
            .field("radius_secret", &"<redacted>")
            .field("deleted_at", &self.deleted_at)
            .finish_non_exhaustive()
    }
}
