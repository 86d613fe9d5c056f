//! 网关中间件

pub mod access_log;
pub mod rate_limit;
pub mod timeout;

pub use access_log::access_log;
pub use rate_limit::{PathRateLimiter, ZeroQuota, rate_limit};
pub use timeout::handle_timeout_error;
