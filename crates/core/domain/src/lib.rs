//! 边缘代理共享的领域模型。
//!
//! - [`NetworkDevice`]：NAS 设备记录，按 RADIUS 地址缓存
//! - [`SubscriberService`]：用户服务记录，按认证用户名缓存
//! - [`ReplyDocument`]：由回复规则聚合出的 RADIUS 回复属性文档

pub mod device;
pub mod reply;
pub mod service;

pub use device::NetworkDevice;
pub use reply::{ReplyDocument, ReplyValue, aggregate_replies};
pub use service::{ReplyRule, SubscriberService};

use serde::{Deserialize, Deserializer};

/// 后端可能对字符串字段下发 `null`，按空字符串处理。
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 只保留非空字符串，空串视为未设置。
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
