//! 同步调度器。
//!
//! - 每次进入 `Connected` 立即执行一个周期，并重置定时器
//! - 定时器到点时若未连接则跳过
//! - 周期内路由器与服务两个任务并发执行，周期之间串行

use std::sync::Arc;
use std::time::Duration;

use agent_rpc::{ConnectionState, RpcCaller};
use agent_storage::{RouterStore, ServiceStore};
use agent_telemetry::{
    metrics, record_sync_cycle, record_sync_failure, record_sync_latency_ms, record_sync_skipped,
    record_sync_success,
};
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::SyncError;
use crate::refresh::{RefreshStats, refresh_routers, refresh_services};

/// 触发同步的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Connected,
    Tick,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Tick => "tick",
        }
    }
}

/// 单个周期的结果。
#[derive(Debug)]
pub struct SyncReport {
    pub routers: Result<RefreshStats, SyncError>,
    pub services: Result<RefreshStats, SyncError>,
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.routers.is_ok() && self.services.is_ok()
    }
}

pub struct SyncScheduler {
    rpc: Arc<dyn RpcCaller>,
    routers: Arc<dyn RouterStore>,
    services: Arc<dyn ServiceStore>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(
        rpc: Arc<dyn RpcCaller>,
        routers: Arc<dyn RouterStore>,
        services: Arc<dyn ServiceStore>,
        interval: Duration,
    ) -> Self {
        Self {
            rpc,
            routers,
            services,
            interval,
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// 调度循环，随进程存活；状态通道关闭时退出。
    pub async fn run(self) {
        let mut state = self.rpc.subscribe_state();
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let initial = *state.borrow_and_update();
        let mut connected = initial.is_connected();
        if connected {
            connected = self.cycle_and_settle(SyncTrigger::Connected, &mut state).await;
            ticker.reset();
        }

        loop {
            tokio::select! {
                changed = state.changed() => {
                    if changed.is_err() {
                        info!(target: "radius.sync", "sync_scheduler_stopped");
                        return;
                    }
                    let current: ConnectionState = *state.borrow_and_update();
                    let entered = current.is_connected() && !connected;
                    connected = current.is_connected();
                    if entered {
                        connected = self.cycle_and_settle(SyncTrigger::Connected, &mut state).await;
                        ticker.reset();
                    }
                }
                _ = ticker.tick() => {
                    let current = self.rpc.state();
                    if !current.is_connected() {
                        record_sync_skipped();
                        debug!(target: "radius.sync", state = %current, "sync_tick_skipped");
                        continue;
                    }
                    connected = self.cycle_and_settle(SyncTrigger::Tick, &mut state).await;
                }
            }
        }
    }

    /// 执行一个周期；周期内连接状态发生过变化且当前已连接时，补跑一个周期。
    ///
    /// 周期内的断线会让进行中的调用失败，重连后的状态可能与周期开始时相同，
    /// 因此以变更通知而非状态值判断。返回当前是否已连接。
    async fn cycle_and_settle(
        &self,
        trigger: SyncTrigger,
        state: &mut watch::Receiver<ConnectionState>,
    ) -> bool {
        self.run_cycle(trigger).await;
        loop {
            if !state.has_changed().unwrap_or(false) {
                return state.borrow().is_connected();
            }
            let current = *state.borrow_and_update();
            if !current.is_connected() {
                return false;
            }
            info!(target: "radius.sync", "sync_reconnected_during_cycle");
            self.run_cycle(SyncTrigger::Connected).await;
        }
    }

    /// 执行一个同步周期：两个刷新任务并发，等待二者结束。
    pub async fn run_cycle(&self, trigger: SyncTrigger) -> SyncReport {
        record_sync_cycle();
        let started = Instant::now();
        info!(target: "radius.sync", trigger = trigger.as_str(), "sync_cycle_started");

        let routers = tokio::spawn(refresh_routers(self.rpc.clone(), self.routers.clone()));
        let services = tokio::spawn(refresh_services(self.rpc.clone(), self.services.clone()));
        let (routers, services) = tokio::join!(routers, services);

        let report = SyncReport {
            routers: flatten("routers", routers),
            services: flatten("services", services),
            elapsed: started.elapsed(),
        };
        record_sync_latency_ms(report.elapsed.as_millis() as u64);
        self.log_report(trigger, &report).await;
        report
    }

    async fn log_report(&self, trigger: SyncTrigger, report: &SyncReport) {
        let router_count = self.routers.count().await.ok();
        let service_count = self.services.count().await.ok();
        let snapshot = metrics().snapshot();
        info!(
            target: "radius.sync",
            trigger = trigger.as_str(),
            success = report.is_success(),
            routers = ?report.routers.as_ref().ok(),
            services = ?report.services.as_ref().ok(),
            cached_routers = ?router_count,
            cached_services = ?service_count,
            elapsed_ms = report.elapsed.as_millis() as u64,
            total_cycles = snapshot.sync_cycles,
            total_upserted = snapshot.records_upserted,
            total_failures = snapshot.sync_failure,
            "sync_cycle_finished"
        );
    }
}

fn flatten(
    cache: &'static str,
    joined: Result<Result<RefreshStats, SyncError>, JoinError>,
) -> Result<RefreshStats, SyncError> {
    let result = joined.unwrap_or_else(|err| Err(SyncError::Task(err.to_string())));
    match &result {
        Ok(_) => record_sync_success(),
        Err(err) => {
            record_sync_failure();
            error!(target: "radius.sync", cache = cache, error = %err, "sync_refresh_failed");
        }
    }
    result
}
