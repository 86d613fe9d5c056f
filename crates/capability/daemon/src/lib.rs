//! RADIUS 守护进程的容器生命周期管理。
//!
//! 只负责“确保按声明运行”：容器以期望镜像运行中则不动，
//! 否则删除并重建。容器引擎通过 `docker` 命令行驱动。

pub mod docker;
pub mod spec;

pub use docker::DockerCliManager;
pub use spec::{HOST_NETWORK, PortBinding, Protocol, ServiceSpec, radius_daemon_spec};

use async_trait::async_trait;

/// 守护进程管理错误。
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("invalid service spec: {0}")]
    InvalidSpec(String),
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("log file error: {0}")]
    Logs(std::io::Error),
}

/// `ensure_service` 的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// 已按期望镜像运行
    AlreadyRunning,
    /// 新建（或重建）并启动
    Started,
}

/// 容器化服务管理接口。
#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn ensure_service(&self, spec: &ServiceSpec) -> Result<EnsureOutcome, DaemonError>;
}
