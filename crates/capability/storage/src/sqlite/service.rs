//! SQLite 用户服务存储实现

use crate::error::StorageError;
use crate::sqlite::now_rfc3339;
use crate::traits::ServiceStore;
use domain::SubscriberService;
use sqlx::{Row, SqlitePool};

pub struct SqliteServiceStore {
    pub pool: SqlitePool,
}

impl SqliteServiceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ServiceStore for SqliteServiceStore {
    async fn put_service(&self, service: &SubscriberService) -> Result<(), StorageError> {
        if service.username.trim().is_empty() {
            return Err(StorageError::EmptyKey);
        }
        let record = serde_json::to_string(service)?;
        sqlx::query(
            "insert into services (username, record, updated_at) values (?1, ?2, ?3) \
             on conflict(username) do update set record = excluded.record, \
             updated_at = excluded.updated_at",
        )
        .bind(&service.username)
        .bind(record)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_service(&self, username: &str) -> Result<SubscriberService, StorageError> {
        let row = sqlx::query("select record from services where username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Err(StorageError::NotFound);
        };
        let record: String = row.try_get("record")?;
        Ok(serde_json::from_str(&record)?)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("select count(*) as total from services")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }
}
