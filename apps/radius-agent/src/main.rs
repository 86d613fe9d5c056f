//! RADIUS 边缘代理：后端同步 + 本地缓存 + 认证网关 + 守护进程管理。

mod agent;
mod handlers;
mod middleware;
mod routes;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agent_config::AppConfig;
use agent_daemon::{DockerCliManager, ServiceManager, radius_daemon_spec};
use agent_storage::{RouterStore, ServiceStore};
use agent_telemetry::init_tracing;
use tracing::{info, warn};

use crate::agent::Agent;
use crate::middleware::PathRateLimiter;

/// 限流器空闲键清理周期。
const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub routers: Arc<dyn RouterStore>,
    pub services: Arc<dyn ServiceStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();
    info!(target: "radius.agent", config = ?config, "radius_agent_starting");

    // 缓存 + 后端通道 + 同步调度
    let mut agent = Agent::start(&config).await?;

    let limiter = PathRateLimiter::radius_default()?;
    agent.track("rate_limit_pruner", limiter.spawn_pruner(LIMITER_PRUNE_INTERVAL));
    let app = routes::build_app(agent.app_state(), limiter);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "radius.agent", addr = %config.http_addr, "gateway_listening");
    let server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    });

    tokio::fs::create_dir_all(config.logs_dir()).await?;
    // 守护进程在网关就绪后启动；失败即退出
    if config.daemon_enabled {
        let manager = DockerCliManager::new(config.logs_dir());
        let spec = radius_daemon_spec(&config);
        let outcome = manager.ensure_service(&spec).await?;
        info!(target: "radius.agent", name = %spec.name, outcome = ?outcome, "daemon_ensured");
        agent.track("daemon_logs", manager.follow_logs(&spec.name).await?);
    } else {
        info!(target: "radius.agent", "daemon_management_disabled");
    }

    let served = server.await?;
    agent.shutdown().await;
    served?;
    info!(target: "radius.agent", "radius_agent_stopped");
    Ok(())
}

/// Ctrl-C 或 SIGTERM。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target: "radius.agent", error = %err, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target: "radius.agent", error = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!(target: "radius.agent", "shutdown_signal_received");
}
