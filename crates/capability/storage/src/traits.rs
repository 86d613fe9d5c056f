//! 存储接口 Trait 定义
//!
//! - RouterStore：路由器（NAS）缓存
//! - ServiceStore：用户服务缓存
//!
//! 设计原则：
//! - 写入为按键覆盖，重复写入同一记录结果不变
//! - 未命中返回 `StorageError::NotFound`
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use async_trait::async_trait;
use domain::{NetworkDevice, SubscriberService};

/// 路由器缓存接口
#[async_trait]
pub trait RouterStore: Send + Sync {
    /// 按 `cache_key()` 覆盖写入
    async fn put_router(&self, device: &NetworkDevice) -> Result<(), StorageError>;

    /// 按 RADIUS 源地址（或管理地址）查询
    async fn get_router(&self, ip: &str) -> Result<NetworkDevice, StorageError>;

    /// 当前缓存条数
    async fn count(&self) -> Result<u64, StorageError>;
}

/// 用户服务缓存接口
#[async_trait]
pub trait ServiceStore: Send + Sync {
    /// 按 `username` 覆盖写入
    async fn put_service(&self, service: &SubscriberService) -> Result<(), StorageError>;

    /// 按认证用户名查询
    async fn get_service(&self, username: &str) -> Result<SubscriberService, StorageError>;

    /// 当前缓存条数
    async fn count(&self) -> Result<u64, StorageError>;
}
