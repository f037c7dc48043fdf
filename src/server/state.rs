//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::rate_limit::{AdmissionControl, Clock, RateLimiter};
use crate::storage::rate_limit::RateLimitStore;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc for cheap sharing across worker threads.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Configuration (shared read-only)
    pub config: Arc<Config>,
    /// Per-request admission decisions
    pub admission: Arc<AdmissionControl>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Config, admission: AdmissionControl) -> Self {
        Self {
            config: Arc::new(config),
            admission: Arc::new(admission),
        }
    }

    /// Wire admission control over `store` as configured
    pub fn build(
        config: Config,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let timeout = Duration::from_millis(config.rate_limit.store_timeout_ms);
        let limiter = RateLimiter::with_clock(store, clock, timeout);
        let admission = AdmissionControl::new(&config.rate_limit, limiter)?;
        Ok(Self::new(config, admission))
    }
}
