//! 存储层错误类型

/// 存储错误。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 键不存在（缓存未命中）
    #[error("record not found")]
    NotFound,
    /// 记录无法计算缓存键（`ip`/`radius_ip`/`username` 均为空）
    #[error("record has empty cache key")]
    EmptyKey,
    /// 底层数据库或文件系统错误
    #[error("storage backend: {0}")]
    Backend(String),
    /// 记录编解码失败
    #[error("record codec: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
