//! 缓存同步：连接建立时立即刷新，之后按固定间隔刷新。

pub mod refresh;
pub mod scheduler;

pub use refresh::{RefreshStats, RoutersResult, ServicesResult, refresh_routers, refresh_services};
pub use scheduler::{SyncReport, SyncScheduler, SyncTrigger};

use agent_rpc::RpcError;

/// 同步错误。
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("rpc call failed: {0}")]
    Rpc(#[from] RpcError),
    /// 响应结果结构不符，未写入任何记录
    #[error("decode result failed: {0}")]
    Decode(String),
    /// 刷新任务 panic 或被取消
    #[error("refresh task failed: {0}")]
    Task(String),
}
