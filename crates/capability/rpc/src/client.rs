//! MQTT 通道客户端。
//!
//! 主题约定（`prefix` 默认 `radius/rpc`）：
//! - 请求：`{prefix}/{client_id}/request`，载荷 `{id, method, data}`
//! - 响应：`{prefix}/{client_id}/reply`，载荷 `{id, data}` 或 `{id, error}`
//! - 广播：`{prefix}/broadcast`，仅转交观察者

use std::sync::Arc;
use std::time::Duration;

use agent_telemetry::{record_rpc_call, record_rpc_failure};
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, Transport};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::RpcCaller;
use crate::error::RpcError;
use crate::pending::PendingCalls;
use crate::reply::{notify_observer, route_reply};
use crate::types::{ChannelEvent, ChannelObserver, ConnectionState, RequestFrame, RpcResponse};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// 用户服务全量列表可能较大
const MAX_INCOMING_PACKET: usize = 16 * 1024 * 1024;
const MAX_OUTGOING_PACKET: usize = 256 * 1024;

/// MQTT 通道配置。
#[derive(Clone)]
pub struct MqttChannelConfig {
    pub host: String,
    pub port: u16,
    /// 是否启用 TLS
    pub secure: bool,
    /// 后端令牌，作为 MQTT 密码提交
    pub token: String,
    pub topic_prefix: String,
    pub call_timeout: Duration,
    pub keep_alive: Duration,
}

impl std::fmt::Debug for MqttChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttChannelConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("topic_prefix", &self.topic_prefix)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

struct Topics {
    request: String,
    reply: String,
    broadcast: String,
}

impl Topics {
    fn new(prefix: &str, client_id: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            request: format!("{prefix}/{client_id}/request"),
            reply: format!("{prefix}/{client_id}/reply"),
            broadcast: format!("{prefix}/broadcast"),
        }
    }
}

/// MQTT 通道客户端（可克隆，共享同一连接）。
#[derive(Clone)]
pub struct MqttChannelClient {
    client: AsyncClient,
    client_id: String,
    request_topic: String,
    call_timeout: Duration,
    pending: Arc<PendingCalls>,
    state: watch::Receiver<ConnectionState>,
}

impl MqttChannelClient {
    /// 建立通道并启动驱动任务；连接在后台进行，失败自动重试。
    pub fn connect(
        config: MqttChannelConfig,
        observer: Option<ChannelObserver>,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), RpcError> {
        if config.host.trim().is_empty() {
            return Err(RpcError::Channel("empty backend host".to_string()));
        }
        let client_id = format!("radius-agent-{}", uuid::Uuid::new_v4());
        let mut options = MqttOptions::new(client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(config.keep_alive);
        options.set_clean_session(true);
        options.set_credentials("radius-agent", config.token.clone());
        options.set_max_packet_size(MAX_INCOMING_PACKET, MAX_OUTGOING_PACKET);
        if config.secure {
            options.set_transport(Transport::tls_with_default_config());
        }
        let (client, eventloop) = AsyncClient::new(options, 10);

        let topics = Topics::new(&config.topic_prefix, &client_id);
        let pending = Arc::new(PendingCalls::new());
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        info!(
            target: "radius.rpc",
            host = %config.host,
            port = config.port,
            secure = config.secure,
            client_id = %client_id,
            "rpc_channel_connecting"
        );

        let request_topic = topics.request.clone();
        let handle = tokio::spawn(drive(Driver {
            eventloop,
            client: client.clone(),
            client_id: client_id.clone(),
            topics,
            pending: pending.clone(),
            state: state_tx,
            observer,
        }));

        Ok((
            Self {
                client,
                client_id,
                request_topic,
                call_timeout: config.call_timeout,
                pending,
                state: state_rx,
            },
            handle,
        ))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// 主动断开（退出时调用）。
    pub async fn disconnect(&self) {
        if let Err(err) = self.client.disconnect().await {
            debug!(target: "radius.rpc", error = %err, "rpc_channel_disconnect_failed");
        }
    }

    async fn publish_and_wait(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<RpcResponse, RpcError> {
        if !self.state.borrow().is_connected() {
            return Err(RpcError::Channel("not connected".to_string()));
        }
        let id = uuid::Uuid::new_v4().to_string();
        let frame = serde_json::to_vec(&RequestFrame {
            id: &id,
            method: action,
            data: &payload,
        })
        .map_err(|err| RpcError::Channel(format!("encode request: {err}")))?;

        let reply = self.pending.register(id.clone());
        let exchange = async {
            self.client
                .publish(self.request_topic.as_str(), QoS::AtLeastOnce, false, frame)
                .await
                .map_err(|err| RpcError::Channel(err.to_string()))?;
            debug!(target: "radius.rpc", call_id = %id, action = %action, "rpc_call_published");
            reply
                .await
                .map_err(|_| RpcError::Channel("channel dropped".to_string()))?
        };

        match tokio::time::timeout(self.call_timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                self.pending.remove(&id);
                Err(err)
            }
            Err(_) => {
                self.pending.remove(&id);
                Err(RpcError::Timeout(self.call_timeout))
            }
        }
    }
}

#[async_trait]
impl RpcCaller for MqttChannelClient {
    async fn call(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<RpcResponse, RpcError> {
        record_rpc_call();
        let result = self.publish_and_wait(action, payload).await;
        if let Err(err) = &result {
            record_rpc_failure();
            warn!(target: "radius.rpc", action = %action, error = %err, "rpc_call_failed");
        }
        result
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }
}

struct Driver {
    eventloop: EventLoop,
    client: AsyncClient,
    client_id: String,
    topics: Topics,
    pending: Arc<PendingCalls>,
    state: watch::Sender<ConnectionState>,
    observer: Option<ChannelObserver>,
}

/// 驱动事件循环：维护连接状态、分发响应、断线后指数退避重连。
async fn drive(mut driver: Driver) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match driver.eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                backoff = INITIAL_BACKOFF;
                for topic in [&driver.topics.reply, &driver.topics.broadcast] {
                    if let Err(err) = driver.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce)
                    {
                        warn!(target: "radius.rpc", topic = %topic, error = %err, "rpc_subscribe_failed");
                    }
                }
                driver.state.send_replace(ConnectionState::Connected);
                info!(target: "radius.rpc", client_id = %driver.client_id, "rpc_channel_connected");
                notify_observer(
                    driver.observer.as_ref(),
                    &ChannelEvent::Connected {
                        client_id: driver.client_id.clone(),
                    },
                );
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic == driver.topics.reply {
                    route_reply(&driver.pending, &publish.payload);
                } else {
                    notify_observer(
                        driver.observer.as_ref(),
                        &ChannelEvent::Message {
                            topic: publish.topic.clone(),
                            payload: publish.payload.to_vec(),
                        },
                    );
                }
            }
            Ok(_) => {}
            Err(err) => {
                let previous = driver.state.send_replace(ConnectionState::Disconnected);
                let failed = driver.pending.fail_all("channel disconnected");
                warn!(
                    target: "radius.rpc",
                    error = %err,
                    failed_calls = failed,
                    retry_in_ms = backoff.as_millis() as u64,
                    "rpc_channel_error"
                );
                if previous.is_connected() {
                    notify_observer(
                        driver.observer.as_ref(),
                        &ChannelEvent::Disconnected {
                            reason: err.to_string(),
                        },
                    );
                }
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                driver.state.send_replace(ConnectionState::Connecting);
            }
        }
    }
}
