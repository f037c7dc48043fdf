//! Rate limit types and data structures

use crate::config::models::rate_limit::RateLimitConfig;
use crate::utils::error::{Result, WardenError};
use serde::Serialize;
use std::fmt;

/// What a rate limit key is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScope {
    /// An authenticated caller
    User,
    /// An anonymous caller, keyed by network address
    Ip,
}

impl KeyScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyScope::User => "user",
            KeyScope::Ip => "ip",
        }
    }
}

impl fmt::Display for KeyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque rate limit key of the form `{scope}:{class}:{digest}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted per-key bucket state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitState {
    /// Current token count, in `[0, burst]`
    pub tokens: f64,
    /// Unix time in seconds of the last refill
    pub last_refill_at: f64,
    /// Number of violations ever recorded against this key
    pub violation_count: u64,
    /// Unix time in seconds before which every request is denied; `0` when none is active
    pub cooldown_until: f64,
}

impl RateLimitState {
    /// A full bucket with no history
    pub fn initial(config: &RateLimitConfig, now: f64) -> Self {
        Self {
            tokens: f64::from(config.burst),
            last_refill_at: now,
            violation_count: 0,
            cooldown_until: 0.0,
        }
    }

    /// Whether a cooldown is still running at `now`
    pub fn in_cooldown(&self, now: f64) -> bool {
        self.cooldown_until > now
    }
}

/// Outcome of one admission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitResult {
    /// Whether the request was admitted
    pub allowed: bool,
    /// Whole tokens left after the decision
    pub tokens_remaining: u64,
    /// Seconds to wait before retrying; `0` when admitted
    pub retry_after: u64,
    /// Violation count after the decision
    pub violations: u64,
}

impl RateLimitResult {
    pub fn allowed(tokens_remaining: u64, violations: u64) -> Self {
        Self {
            allowed: true,
            tokens_remaining,
            retry_after: 0,
            violations,
        }
    }

    pub fn denied(tokens_remaining: u64, retry_after: u64, violations: u64) -> Self {
        Self {
            allowed: false,
            tokens_remaining,
            retry_after,
            violations,
        }
    }

    /// Result reported when the store cannot be consulted
    pub fn fail_open(config: &RateLimitConfig) -> Self {
        Self::allowed(u64::from(config.burst), 0)
    }

    /// Decode the `{allowed, tokens_remaining, retry_after, violations}` reply of the store script
    pub fn from_script_reply(reply: &[i64]) -> Result<Self> {
        let [allowed, tokens, retry_after, violations] = reply else {
            return Err(WardenError::store(format!(
                "Unexpected script reply of {} elements",
                reply.len()
            )));
        };
        let non_negative = |value: i64, field: &str| {
            u64::try_from(value).map_err(|_| {
                WardenError::store(format!("Negative {} in script reply: {}", field, value))
            })
        };

        Ok(Self {
            allowed: *allowed == 1,
            tokens_remaining: non_negative(*tokens, "tokens_remaining")?,
            retry_after: non_negative(*retry_after, "retry_after")?,
            violations: non_negative(*violations, "violations")?,
        })
    }
}
