//! In-process rate limit store
//!
//! Atomic per key through the DashMap shard lock held across read, evaluation and write.
//! State is not shared between processes, so it is only a stand-in for Redis in
//! single-process deployments and tests.

use super::{RateLimitStore, StoreHealth};
use crate::config::models::rate_limit::RateLimitConfig;
use crate::core::rate_limit::{Clock, RateLimitKey, RateLimitResult, RateLimitState, evaluate};
use crate::utils::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: RateLimitState,
    /// Unix seconds after which the entry is equivalent to a fresh bucket
    expires_at: f64,
}

/// Rate limit store local to this process
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    buckets: DashMap<String, Entry>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drop entries whose expiry has passed at `now`, returning how many were removed
    pub fn evict_expired(&self, now: f64) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.buckets.len())
    }

    /// Start background eviction
    pub fn start_cleanup_task(self: Arc<Self>, clock: Arc<dyn Clock>, every: Duration) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = self.evict_expired(clock.now_secs());
                if evicted > 0 {
                    debug!("Evicted {} expired rate limit buckets", evicted);
                }
            }
        });
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_consume(
        &self,
        key: &RateLimitKey,
        config: &RateLimitConfig,
        now: f64,
        requested_tokens: u32,
    ) -> Result<RateLimitResult> {
        let mut entry = self
            .buckets
            .entry(key.as_str().to_string())
            .or_insert_with(|| Entry {
                state: RateLimitState::initial(config, now),
                expires_at: now,
            });

        let prior = if entry.expires_at < now {
            RateLimitState::initial(config, now)
        } else {
            entry.state
        };
        let (state, result) = evaluate(prior, config, now, requested_tokens);
        // Denials inside an active cooldown leave the entry untouched, expiry included
        if !prior.in_cooldown(now) {
            entry.state = state;
            entry.expires_at = now + config.key_ttl_secs() as f64;
        }
        Ok(result)
    }

    async fn health_check(&self) -> Result<StoreHealth> {
        Ok(StoreHealth {
            backend: self.backend_name(),
            connected: true,
            script_ready: true,
            error: None,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
