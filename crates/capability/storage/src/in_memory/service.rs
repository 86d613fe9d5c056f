//! 用户服务内存存储实现

use crate::error::StorageError;
use crate::traits::ServiceStore;
use domain::SubscriberService;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryServiceStore {
    services: RwLock<HashMap<String, SubscriberService>>,
}

impl InMemoryServiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ServiceStore for InMemoryServiceStore {
    async fn put_service(&self, service: &SubscriberService) -> Result<(), StorageError> {
        if service.username.trim().is_empty() {
            return Err(StorageError::EmptyKey);
        }
        let mut map = self
            .services
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        map.insert(service.username.clone(), service.clone());
        Ok(())
    }

    async fn get_service(&self, username: &str) -> Result<SubscriberService, StorageError> {
        self.services
            .read()
            .map_err(|_| StorageError::backend("lock failed"))?
            .get(username)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let map = self
            .services
            .read()
            .map_err(|_| StorageError::backend("lock failed"))?;
        Ok(map.len() as u64)
    }
}
