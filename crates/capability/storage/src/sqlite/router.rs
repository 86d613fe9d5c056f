//! SQLite 路由器存储实现

use crate::error::StorageError;
use crate::sqlite::now_rfc3339;
use crate::traits::RouterStore;
use domain::NetworkDevice;
use sqlx::{Row, SqlitePool};

pub struct SqliteRouterStore {
    pub pool: SqlitePool,
}

impl SqliteRouterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RouterStore for SqliteRouterStore {
    async fn put_router(&self, device: &NetworkDevice) -> Result<(), StorageError> {
        let key = device.cache_key();
        if key.trim().is_empty() {
            return Err(StorageError::EmptyKey);
        }
        let record = serde_json::to_string(device)?;
        sqlx::query(
            "insert into routers (ip, record, updated_at) values (?1, ?2, ?3) \
             on conflict(ip) do update set record = excluded.record, \
             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(record)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_router(&self, ip: &str) -> Result<NetworkDevice, StorageError> {
        let row = sqlx::query("select record from routers where ip = ?1")
            .bind(ip)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Err(StorageError::NotFound);
        };
        let record: String = row.try_get("record")?;
        Ok(serde_json::from_str(&record)?)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("select count(*) as total from routers")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }
}
