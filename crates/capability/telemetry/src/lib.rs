//! 追踪、请求 ID 生成与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sync_cycles: u64,
    pub sync_skipped: u64,
    pub sync_success: u64,
    pub sync_failure: u64,
    pub records_upserted: u64,
    pub upsert_failure: u64,
    pub sync_latency_ms_total: u64,
    pub sync_latency_ms_count: u64,
    pub rpc_calls: u64,
    pub rpc_failures: u64,
    pub auth_hits: u64,
    pub auth_misses: u64,
    pub client_hits: u64,
    pub client_misses: u64,
    pub rate_limited: u64,
    pub timeouts: u64,
}

/// 进程级计数器。
#[derive(Default)]
pub struct TelemetryMetrics {
    sync_cycles: AtomicU64,
    sync_skipped: AtomicU64,
    sync_success: AtomicU64,
    sync_failure: AtomicU64,
    records_upserted: AtomicU64,
    upsert_failure: AtomicU64,
    sync_latency_ms_total: AtomicU64,
    sync_latency_ms_count: AtomicU64,
    rpc_calls: AtomicU64,
    rpc_failures: AtomicU64,
    auth_hits: AtomicU64,
    auth_misses: AtomicU64,
    client_hits: AtomicU64,
    client_misses: AtomicU64,
    rate_limited: AtomicU64,
    timeouts: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sync_cycles: self.sync_cycles.load(Ordering::Relaxed),
            sync_skipped: self.sync_skipped.load(Ordering::Relaxed),
            sync_success: self.sync_success.load(Ordering::Relaxed),
            sync_failure: self.sync_failure.load(Ordering::Relaxed),
            records_upserted: self.records_upserted.load(Ordering::Relaxed),
            upsert_failure: self.upsert_failure.load(Ordering::Relaxed),
            sync_latency_ms_total: self.sync_latency_ms_total.load(Ordering::Relaxed),
            sync_latency_ms_count: self.sync_latency_ms_count.load(Ordering::Relaxed),
            rpc_calls: self.rpc_calls.load(Ordering::Relaxed),
            rpc_failures: self.rpc_failures.load(Ordering::Relaxed),
            auth_hits: self.auth_hits.load(Ordering::Relaxed),
            auth_misses: self.auth_misses.load(Ordering::Relaxed),
            client_hits: self.client_hits.load(Ordering::Relaxed),
            client_misses: self.client_misses.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录同步周期启动次数。
pub fn record_sync_cycle() {
    metrics().sync_cycles.fetch_add(1, Ordering::Relaxed);
}

/// 记录因未连接而跳过的定时同步。
pub fn record_sync_skipped() {
    metrics().sync_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录单个缓存刷新任务成功。
pub fn record_sync_success() {
    metrics().sync_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录单个缓存刷新任务失败（RPC、解码或任务异常）。
pub fn record_sync_failure() {
    metrics().sync_failure.fetch_add(1, Ordering::Relaxed);
}

pub fn record_upserted(count: u64) {
    metrics()
        .records_upserted
        .fetch_add(count, Ordering::Relaxed);
}

pub fn record_upsert_failure() {
    metrics().upsert_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录同步周期耗时（毫秒）。
pub fn record_sync_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .sync_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .sync_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录 RPC 调用次数。
pub fn record_rpc_call() {
    metrics().rpc_calls.fetch_add(1, Ordering::Relaxed);
}

pub fn record_rpc_failure() {
    metrics().rpc_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录认证命中（返回回复文档）。
pub fn record_auth_hit() {
    metrics().auth_hits.fetch_add(1, Ordering::Relaxed);
}

/// 记录认证拒绝（解码失败或用户未知）。
pub fn record_auth_miss() {
    metrics().auth_misses.fetch_add(1, Ordering::Relaxed);
}

pub fn record_client_hit() {
    metrics().client_hits.fetch_add(1, Ordering::Relaxed);
}

pub fn record_client_miss() {
    metrics().client_misses.fetch_add(1, Ordering::Relaxed);
}

/// 记录被限流拒绝的请求。
pub fn record_rate_limited() {
    metrics().rate_limited.fetch_add(1, Ordering::Relaxed);
}

/// 记录超时的请求。
pub fn record_timeout() {
    metrics().timeouts.fetch_add(1, Ordering::Relaxed);
}
