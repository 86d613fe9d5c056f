//! # SQLite 存储实现模块
//!
//! 生产环境实现，两个缓存共用 [`crate::CacheDb`] 的连接池。
//!
//! - 所有 SQL 使用参数绑定
//! - upsert 使用 `insert .. on conflict do update`，同键重复写入幂等
//! - 记录整体以 JSON 文本存储于 `record` 列

pub mod router;
pub mod service;

pub use router::*;
pub use service::*;

use chrono::{SecondsFormat, Utc};

/// 写入时间戳（仅用于排查）。
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
