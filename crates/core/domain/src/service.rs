//! 用户服务记录与回复规则。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::nullable_string;
use crate::reply::{ReplyDocument, aggregate_replies};

/// 单条授权回复规则（对应 radreply 表的一行）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRule {
    #[serde(default, deserialize_with = "nullable_string")]
    pub attribute: String,
    /// 运算符（`:=`、`+=` 等），本系统不解释
    #[serde(default, deserialize_with = "nullable_string")]
    pub op: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub value: String,
}

impl ReplyRule {
    pub fn new(
        attribute: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            op: op.into(),
            value: value.into(),
        }
    }
}

/// 后端下发的用户服务记录，按 `username` 缓存。
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriberService {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub radius_template_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub service_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub username: String,
    /// 认证口令，禁止写入日志
    #[serde(default, deserialize_with = "nullable_string")]
    pub password: String,
    #[serde(default)]
    pub radreply: Vec<ReplyRule>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubscriberService {
    /// 按存储顺序聚合回复属性。
    pub fn reply_document(&self) -> ReplyDocument {
        aggregate_replies(&self.radreply)
    }
}

impl std::fmt::Debug for SubscriberService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberService")
            .field("id", &self.id)
            .field("service_id", &self.service_id)
            .field("radius_template_id", &self.radius_template_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("radreply", &self.radreply.len())
            .finish_non_exhaustive()
    }
}
