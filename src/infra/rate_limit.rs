use async_trait::async_trait;
use redis::{Script, aio::ConnectionManager};

use crate::app_error::{AppError, AppResult};

#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Counts one request from `ip`. Err(AppError::RateLimited) once the
    /// window's budget is spent.
    async fn check(&self, ip: &str) -> AppResult<()>;
}

/// Atomic increment that sets the TTL on first use, and repairs a key that
/// somehow lost its TTL.
const INCR_WITH_TTL_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
elseif redis.call('TTL', KEYS[1]) == -1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return current
"#;

/// Fixed-window per-IP limiter backed by Redis.
#[derive(Clone)]
pub struct RedisRateLimiter {
    manager: ConnectionManager,
    window_secs: u64,
    max_per_ip: u64,
    script: Script,
}

impl RedisRateLimiter {
    pub fn from_manager(manager: ConnectionManager, window_secs: u64, max_per_ip: u64) -> Self {
        Self {
            manager,
            window_secs,
            max_per_ip,
            script: Script::new(INCR_WITH_TTL_SCRIPT),
        }
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let current: u64 = self
            .script
            .key(format!("rate:ip:{ip}"))
            .arg(self.window_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if current > self.max_per_ip {
            return Err(AppError::RateLimited);
        }

        Ok(())
    }
}
