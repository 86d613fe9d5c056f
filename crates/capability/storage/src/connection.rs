//! 数据库连接管理
//!
//! 缓存目录下的单个 SQLite 文件 `radius.db`，两个缓存共用一个连接池：
//! - `routers(ip)`：路由器记录
//! - `services(username)`：用户服务记录

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::StorageError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

/// 数据库文件名。
pub const DATABASE_FILE: &str = "radius.db";

const SCHEMA: [&str; 2] = [
    "create table if not exists routers (\
       ip text primary key not null, \
       record text not null, \
       updated_at text not null)",
    "create table if not exists services (\
       username text primary key not null, \
       record text not null, \
       updated_at text not null)",
];

/// 已打开的缓存数据库。
#[derive(Clone)]
pub struct CacheDb {
    pool: SqlitePool,
    path: PathBuf,
}

impl CacheDb {
    /// 打开（必要时创建）缓存目录与数据库文件，并建表。
    ///
    /// 进程启动时调用一次；失败视为致命错误。
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(DATABASE_FILE);
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        info!(target: "radius.storage", path = %path.display(), "cache_db_opened");
        Ok(Self { pool, path })
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 关闭连接池，等待 WAL 落盘。
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
