//! Admission control
//!
//! Ties classification, identification, key derivation and the limiter into the single
//! decision the HTTP middleware needs per request.

use super::classifier::Classifier;
use super::identity::{CallerContext, CallerId, CallerIdentifier};
use super::key::derive_key;
use super::limiter::{DEFAULT_REQUESTED_TOKENS, RateLimiter};
use super::types::RateLimitResult;
use crate::config::models::rate_limit::RateLimitSettings;
use crate::utils::error::Result;
use serde::Serialize;
use tracing::{debug, warn};

/// Decision for one request, with everything needed to render rate limit headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionOutcome {
    pub endpoint_class: String,
    /// Configured sustained limit of the class
    pub limit: u32,
    pub result: RateLimitResult,
    /// Unix seconds at which the caller can expect capacity back: the end of the cooldown
    /// when denied, a full bucket when admitted
    pub reset_at: u64,
}

impl AdmissionOutcome {
    pub fn allowed(&self) -> bool {
        self.result.allowed
    }
}

/// Per-request admission decisions
#[derive(Debug, Clone)]
pub struct AdmissionControl {
    classifier: Classifier,
    limiter: RateLimiter,
    identifier: CallerIdentifier,
    enabled: bool,
}

impl AdmissionControl {
    pub fn new(settings: &RateLimitSettings, limiter: RateLimiter) -> Result<Self> {
        Ok(Self {
            classifier: Classifier::new(settings)?,
            limiter,
            identifier: CallerIdentifier::default(),
            enabled: settings.enabled,
        })
    }

    /// Whether requests to `path` skip rate limiting entirely
    pub fn should_bypass(&self, path: &str) -> bool {
        !self.enabled || self.classifier.is_excluded(path)
    }

    pub fn identify(&self, ctx: &CallerContext<'_>) -> CallerId {
        self.identifier.identify(ctx)
    }

    /// Decide whether `caller` may proceed to `path`, consuming a token if so
    pub async fn check(&self, path: &str, caller: &CallerId) -> AdmissionOutcome {
        let class = self.classifier.classify(path);
        let now = self.limiter.now();

        let result = match derive_key(caller.scope, class.name, &caller.identifier) {
            Ok(key) => {
                self.limiter
                    .check_and_consume_at(
                        &key,
                        class.name,
                        class.config,
                        now,
                        DEFAULT_REQUESTED_TOKENS,
                    )
                    .await
            }
            Err(e) => {
                warn!(
                    endpoint_class = class.name,
                    error = %e,
                    "Could not derive rate limit key, admitting request"
                );
                RateLimitResult::fail_open(class.config)
            }
        };

        let wait = if result.allowed {
            class.config.seconds_until_full(result.tokens_remaining)
        } else {
            debug!(
                endpoint_class = class.name,
                scope = %caller.scope,
                retry_after = result.retry_after,
                violations = result.violations,
                "Request denied by rate limit"
            );
            result.retry_after
        };

        AdmissionOutcome {
            endpoint_class: class.name.to_string(),
            limit: class.config.limit,
            result,
            reset_at: (now.max(0.0).ceil() as u64).saturating_add(wait),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
