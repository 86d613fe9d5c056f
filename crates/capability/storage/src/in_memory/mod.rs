//! 内存存储实现模块
//!
//! 仅用于测试。
//!
//! 包含以下实现：
//! - RouterStore: InMemoryRouterStore
//! - ServiceStore: InMemoryServiceStore

pub mod router;
pub mod service;

pub use router::*;
pub use service::*;
