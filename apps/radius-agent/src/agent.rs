//! 代理运行上下文：持有 RPC 通道、两个缓存与后台任务句柄。

use std::sync::Arc;
use std::time::Duration;

use agent_config::AppConfig;
use agent_rpc::{ChannelEvent, ChannelObserver, MqttChannelClient, MqttChannelConfig};
use agent_storage::{CacheDb, RouterStore, ServiceStore, SqliteRouterStore, SqliteServiceStore};
use agent_sync::SyncScheduler;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::AppState;

const RPC_KEEP_ALIVE: Duration = Duration::from_secs(30);

pub struct Agent {
    rpc: MqttChannelClient,
    routers: Arc<dyn RouterStore>,
    services: Arc<dyn ServiceStore>,
    db: CacheDb,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Agent {
    /// 打开缓存、建立后端通道并启动同步调度。
    ///
    /// 后端不可达不影响启动，网关继续使用已缓存的数据。
    pub async fn start(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = CacheDb::open(&config.cache_dir).await?;
        let routers: Arc<dyn RouterStore> = Arc::new(SqliteRouterStore::new(db.pool()));
        let services: Arc<dyn ServiceStore> = Arc::new(SqliteServiceStore::new(db.pool()));
        info!(
            target: "radius.agent",
            path = %db.path().display(),
            routers = routers.count().await?,
            services = services.count().await?,
            "cache_loaded"
        );

        let endpoint = config.rpc_endpoint()?;
        let observer: ChannelObserver = Arc::new(log_channel_event);
        let (rpc, driver) = MqttChannelClient::connect(
            MqttChannelConfig {
                host: endpoint.host,
                port: endpoint.port,
                secure: endpoint.secure,
                token: config.token.clone(),
                topic_prefix: config.rpc_topic_prefix.clone(),
                call_timeout: config.rpc_timeout(),
                keep_alive: RPC_KEEP_ALIVE,
            },
            Some(observer),
        )?;

        let scheduler = SyncScheduler::new(
            Arc::new(rpc.clone()),
            routers.clone(),
            services.clone(),
            config.sync_interval(),
        )
        .spawn();

        Ok(Self {
            rpc,
            routers,
            services,
            db,
            tasks: vec![("rpc_driver", driver), ("sync_scheduler", scheduler)],
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            routers: self.routers.clone(),
            services: self.services.clone(),
        }
    }

    /// 登记随进程存活的后台任务。
    pub fn track(&mut self, name: &'static str, handle: JoinHandle<()>) {
        self.tasks.push((name, handle));
    }

    pub async fn shutdown(self) {
        for (name, handle) in &self.tasks {
            handle.abort();
            debug!(target: "radius.agent", task = *name, "task_aborted");
        }
        self.rpc.disconnect().await;
        self.db.close().await;
        info!(target: "radius.agent", "agent_shutdown");
    }
}

fn log_channel_event(event: &ChannelEvent) {
    match event {
        ChannelEvent::Connected { client_id } => {
            info!(target: "radius.agent", client_id = %client_id, "backend_connected")
        }
        ChannelEvent::Disconnected { reason } => {
            warn!(target: "radius.agent", reason = %reason, "backend_disconnected")
        }
        ChannelEvent::Message { topic, payload } => info!(
            target: "radius.agent",
            topic = %topic,
            data = %String::from_utf8_lossy(payload),
            "backend_message"
        ),
    }
}
