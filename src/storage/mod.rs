//! Storage layer for the rate governor
//!
//! Rate limit state lives in Redis when it is enabled, shared by every server process. With
//! Redis disabled, state is kept in process memory and each process limits independently.

/// Rate limit state stores
pub mod rate_limit;
/// Redis connection management
pub mod redis;

use crate::config::StorageConfig;
use crate::core::rate_limit::Clock;
use crate::utils::error::Result;
use self::rate_limit::{MemoryRateLimitStore, RateLimitStore, RedisRateLimitStore};
use self::redis::RedisPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How often the in-process store drops expired buckets
const MEMORY_EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Build the rate limit store selected by configuration.
///
/// Construction never touches the network: Redis connects lazily on first use, so an
/// unreachable Redis at startup degrades to fail-open instead of blocking the server.
/// The in-process store evicts expired buckets on a background task, so this must run
/// inside a Tokio runtime.
pub fn build_rate_limit_store(
    config: &StorageConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn RateLimitStore>> {
    if config.redis.enabled {
        let pool = Arc::new(RedisPool::new(&config.redis)?);
        info!("Using Redis rate limit store");
        Ok(Arc::new(RedisRateLimitStore::new(pool)))
    } else {
        warn!("Redis disabled, rate limit state is local to this process");
        let store = Arc::new(MemoryRateLimitStore::new());
        Arc::clone(&store).start_cleanup_task(clock, MEMORY_EVICTION_INTERVAL);
        Ok(store)
    }
}
