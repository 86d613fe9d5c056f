//! 按请求路径限流（GCRA）。
//!
//! 同一路径的所有客户端共享一个令牌桶。空闲键由 [`PathRateLimiter::spawn_pruner`]
//! 定期清理。

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};
use tracing::debug;

use crate::utils::response::rate_limited;

/// 每分钟持续速率
pub const PER_MINUTE: u32 = 20;
/// 突发容量
pub const BURST: u32 = 5;

type KeyedLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock, NoOpMiddleware>;

#[derive(Debug, thiserror::Error)]
#[error("rate limit quota must be positive (per_minute={per_minute}, burst={burst})")]
pub struct ZeroQuota {
    pub per_minute: u32,
    pub burst: u32,
}

#[derive(Clone)]
pub struct PathRateLimiter {
    inner: Arc<KeyedLimiter>,
}

impl PathRateLimiter {
    pub fn new(per_minute: u32, burst: u32) -> Result<Self, ZeroQuota> {
        let zero = || ZeroQuota { per_minute, burst };
        let rate = NonZeroU32::new(per_minute).ok_or_else(zero)?;
        let burst = NonZeroU32::new(burst).ok_or_else(zero)?;
        let quota = Quota::per_minute(rate).allow_burst(burst);
        Ok(Self {
            inner: Arc::new(RateLimiter::dashmap(quota)),
        })
    }

    /// 网关默认配额：突发 5，持续 20/分钟。
    pub fn radius_default() -> Result<Self, ZeroQuota> {
        Self::new(PER_MINUTE, BURST)
    }

    /// 消耗一个令牌；超额时返回需要等待的时长。
    pub fn check(&self, path: &str) -> Result<(), Duration> {
        self.inner
            .check_key(&path.to_string())
            .map_err(|not_until| not_until.wait_time_from(DefaultClock::default().now()))
    }

    pub fn retain_recent(&self) {
        self.inner.retain_recent();
    }

    pub fn tracked_paths(&self) -> usize {
        self.inner.len()
    }

    pub fn spawn_pruner(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                limiter.retain_recent();
                limiter.inner.shrink_to_fit();
                debug!(target: "radius.http", paths = limiter.tracked_paths(), "rate_limiter_pruned");
            }
        })
    }
}

pub async fn rate_limit(
    State(limiter): State<PathRateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    match limiter.check(&path) {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            agent_telemetry::record_rate_limited();
            debug!(
                target: "radius.http",
                path = %path,
                retry_after_ms = wait.as_millis() as u64,
                "request_rate_limited"
            );
            rate_limited(wait)
        }
    }
}
