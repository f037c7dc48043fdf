//! Rate limiter
//!
//! Wraps a [`RateLimitStore`] with the process clock and a bounded store round-trip. Store
//! failures and timeouts never reach callers: they are logged and the request is admitted.

use super::clock::{Clock, SystemClock};
use super::types::{RateLimitKey, RateLimitResult};
use crate::config::models::rate_limit::RateLimitConfig;
use crate::storage::rate_limit::{RateLimitStore, StoreHealth};
use crate::utils::error::WardenError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Tokens consumed by one request
pub const DEFAULT_REQUESTED_TOKENS: u32 = 1;

/// Rate limiter implementation
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl RateLimiter {
    /// Create a limiter on the system clock
    pub fn new(store: Arc<dyn RateLimitStore>, timeout: Duration) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), timeout)
    }

    /// Create a limiter on a custom clock
    pub fn with_clock(
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            timeout,
        }
    }

    /// Current time in unix seconds, as seen by this limiter
    pub fn now(&self) -> f64 {
        self.clock.now_secs()
    }

    /// Consume one token from `key` now
    pub async fn check_and_consume(
        &self,
        key: &RateLimitKey,
        endpoint_class: &str,
        config: &RateLimitConfig,
    ) -> RateLimitResult {
        self.check_and_consume_at(key, endpoint_class, config, self.now(), DEFAULT_REQUESTED_TOKENS)
            .await
    }

    /// Consume `requested_tokens` from `key` at `now`, failing open on any store error
    pub async fn check_and_consume_at(
        &self,
        key: &RateLimitKey,
        endpoint_class: &str,
        config: &RateLimitConfig,
        now: f64,
        requested_tokens: u32,
    ) -> RateLimitResult {
        let outcome = tokio::time::timeout(
            self.timeout,
            self.store.check_and_consume(key, config, now, requested_tokens),
        )
        .await
        .unwrap_or_else(|_| {
            Err(WardenError::timeout(format!(
                "store did not answer within {}ms",
                self.timeout.as_millis()
            )))
        });

        match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    endpoint_class = endpoint_class,
                    backend = self.store.backend_name(),
                    error = %e,
                    "Rate limit check failed, admitting request"
                );
                RateLimitResult::fail_open(config)
            }
        }
    }

    /// Check the store; errors and timeouts are reported as a disconnected store
    pub async fn health(&self) -> StoreHealth {
        let disconnected = |error: String| StoreHealth {
            backend: self.store.backend_name(),
            connected: false,
            script_ready: false,
            error: Some(error),
        };

        match tokio::time::timeout(self.timeout, self.store.health_check()).await {
            Ok(Ok(health)) => health,
            Ok(Err(e)) => disconnected(e.to_string()),
            Err(_) => disconnected("Health check timeout".to_string()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("backend", &self.store.backend_name())
            .field("clock", &self.clock)
            .field("timeout", &self.timeout)
            .finish()
    }
}
