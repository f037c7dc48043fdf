//! Rate limit state stores
//!
//! A store exposes one mutating operation, [`RateLimitStore::check_and_consume`], which reads a
//! key's state, runs the governor and writes the result back as a single atomic unit with
//! respect to every other caller touching the same key.

mod memory;
mod redis;

pub use self::memory::MemoryRateLimitStore;
pub use self::redis::RedisRateLimitStore;

use crate::config::models::rate_limit::RateLimitConfig;
use crate::core::rate_limit::{RateLimitKey, RateLimitResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Store connectivity as reported by health checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub connected: bool,
    /// Whether the atomic evaluation script is cached server-side
    pub script_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreHealth {
    pub fn healthy(&self) -> bool {
        self.connected && self.script_ready && self.error.is_none()
    }
}

/// Shared, atomic rate limit state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Atomically evaluate one request against the state of `key` at `now` (unix seconds)
    async fn check_and_consume(
        &self,
        key: &RateLimitKey,
        config: &RateLimitConfig,
        now: f64,
        requested_tokens: u32,
    ) -> Result<RateLimitResult>;

    /// Check the store without touching rate limit state
    async fn health_check(&self) -> Result<StoreHealth>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}
