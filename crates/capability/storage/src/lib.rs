//! # Agent Storage 模块
//!
//! 边缘缓存的存储抽象层：后端下发的路由器与用户服务记录在本地持久化，
//! 认证网关在后端不可达时仍可直接查询。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：`RouterStore`、`ServiceStore` 异步接口
//! 2. **错误处理层** (`error.rs`)：统一的 `StorageError`
//! 3. **连接管理层** (`connection.rs`)：SQLite 单文件数据库 `radius.db` 与连接池
//! 4. **实现层**：
//!    - `in_memory/`：内存实现（测试用）
//!    - `sqlite/`：SQLite 实现（生产环境）
//!
//! ## 缓存语义
//!
//! - 路由器按 [`domain::NetworkDevice::cache_key`] 存储（优先 `radius_ip`）
//! - 用户服务按 `username` 存储
//! - 写入为整条覆盖（upsert），同步过程从不删除记录
//! - 记录以 JSON 文本存储，字段变化不需要迁移表结构
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use agent_storage::{CacheDb, RouterStore, SqliteRouterStore};
//!
//! let db = CacheDb::open("/var/lib/radius-agent").await?;
//! let routers = SqliteRouterStore::new(db.pool());
//! let device = routers.get_router("100.64.0.1").await?;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod sqlite;
pub mod traits;

pub use connection::*;
pub use error::*;
pub use traits::*;

pub use in_memory::{InMemoryRouterStore, InMemoryServiceStore};
pub use sqlite::{SqliteRouterStore, SqliteServiceStore};
