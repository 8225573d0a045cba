use super::{RateLimitDecision, RateLimiter};
use crate::config::RateLimitConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;
use uuid::Uuid;

/// Exact sliding log in a sorted set, evaluated atomically.
///
/// KEYS[1] = limiter key
/// ARGV[1] = now (ms), ARGV[2] = window (ms), ARGV[3] = limit, ARGV[4] = member
///
/// Returns {allowed, remaining, reset_after_ms}.
const SLIDING_WINDOW_LUA: &str = r#"
    local key = KEYS[1]
    local now = tonumber(ARGV[1])
    local window = tonumber(ARGV[2])
    local limit = tonumber(ARGV[3])

    redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
    local count = redis.call('ZCARD', key)

    local allowed = 0
    if count < limit then
        redis.call('ZADD', key, now, ARGV[4])
        redis.call('PEXPIRE', key, window)
        count = count + 1
        allowed = 1
    end

    local reset_after = 0
    local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
    if oldest[2] then
        reset_after = tonumber(oldest[2]) + window - now
    end

    return {allowed, limit - count, reset_after}
"#;

/// Redis-backed sliding window limiter shared by all service replicas.
#[derive(Clone)]
pub struct RedisSlidingWindowLimiter {
    redis: ConnectionManager,
    config: RateLimitConfig,
    script: redis::Script,
}

impl RedisSlidingWindowLimiter {
    pub fn new(redis: ConnectionManager, config: RateLimitConfig) -> Self {
        Self {
            redis,
            config,
            script: redis::Script::new(SLIDING_WINDOW_LUA),
        }
    }

    pub fn key_for(&self, identifier: &str) -> String {
        format!("{}:{}", self.config.prefix, identifier)
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn eval(&self, key: &str) -> Result<(i64, i64, i64)> {
        let mut conn = self.redis.clone();
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(format!("system clock before epoch: {}", e)))?
            .as_millis() as i64;
        let window_ms = (self.config.window_seconds * 1000) as i64;
        // Unique member so concurrent admissions in the same millisecond all count.
        let member = format!("{}-{}", now_ms, Uuid::new_v4());

        let result: (i64, i64, i64) = self
            .script
            .key(key)
            .arg(now_ms)
            .arg(window_ms)
            .arg(self.config.max_requests)
            .arg(member)
            .invoke_async(&mut conn)
            .await?;

        Ok(result)
    }
}

/// Decode the script's `{allowed, remaining, reset_after_ms}` reply.
/// Negative counts and durations are clamped to zero.
fn decision_from_reply((allowed, remaining, reset_after_ms): (i64, i64, i64)) -> RateLimitDecision {
    RateLimitDecision {
        allowed: allowed == 1,
        remaining: u32::try_from(remaining.max(0)).unwrap_or(u32::MAX),
        reset_after: Duration::from_millis(reset_after_ms.max(0) as u64),
    }
}

#[async_trait]
impl RateLimiter for RedisSlidingWindowLimiter {
    async fn limit(&self, identifier: &str) -> Result<RateLimitDecision> {
        let key = self.key_for(identifier);

        match timeout(self.timeout(), self.eval(&key)).await {
            Ok(reply) => Ok(decision_from_reply(reply?)),
            Err(_) => Err(AppError::ServiceUnavailable(format!(
                "rate limiter timed out after {}ms",
                self.config.timeout_ms
            ))),
        }
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(AppError::ServiceUnavailable(format!(
                "unexpected PING response: {}",
                pong
            )))
        }
    }
}
