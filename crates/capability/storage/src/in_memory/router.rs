//! 路由器内存存储实现

use crate::error::StorageError;
use crate::traits::RouterStore;
use domain::NetworkDevice;
use std::collections::HashMap;
use std::sync::RwLock;

/// 路由器内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
#[derive(Default)]
pub struct InMemoryRouterStore {
    routers: RwLock<HashMap<String, NetworkDevice>>,
}

impl InMemoryRouterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RouterStore for InMemoryRouterStore {
    async fn put_router(&self, device: &NetworkDevice) -> Result<(), StorageError> {
        let key = device.cache_key();
        if key.trim().is_empty() {
            return Err(StorageError::EmptyKey);
        }
        let mut map = self
            .routers
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        map.insert(key.to_string(), device.clone());
        Ok(())
    }

    async fn get_router(&self, ip: &str) -> Result<NetworkDevice, StorageError> {
        self.routers
            .read()
            .map_err(|_| StorageError::backend("lock failed"))?
            .get(ip)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let map = self
            .routers
            .read()
            .map_err(|_| StorageError::backend("lock failed"))?;
        Ok(map.len() as u64)
    }
}
