/// Post rate limiting
///
/// Sliding-window admission control consulted synchronously before every write.
/// There is no local fallback: a limiter that cannot answer is an error, and the
/// write it guards does not happen.
pub mod redis_window;

pub use redis_window::RedisSlidingWindowLimiter;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Admissions left in the current window after this call.
    pub remaining: u32,
    /// Time until the oldest counted admission leaves the window.
    pub reset_after: Duration,
}

/// Rate limiter trait - abstraction over rate limiting backends.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check `identifier` and, if admitted, record the admission.
    /// Rejected attempts are not recorded.
    async fn limit(&self, identifier: &str) -> Result<RateLimitDecision>;

    /// Connectivity probe for readiness checks
    async fn ping(&self) -> Result<()>;
}
