use std::time::Duration;

/// RPC 调用错误。
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// 未连接、发布失败或等待期间通道断开
    #[error("channel error: {0}")]
    Channel(String),
    /// 响应信封或结果无法解码
    #[error("decode error: {0}")]
    Decode(String),
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
    /// 后端返回的错误帧
    #[error("remote error: {0}")]
    Remote(String),
    /// 响应处理过程中发生 panic
    #[error("reply handling fault: {0}")]
    Fault(String),
}
