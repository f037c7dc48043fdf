//! Token bucket governor
//!
//! The admission algorithm as a pure function of `(state, config, now)`. Every store backend
//! evaluates exactly this logic inside its own atomicity boundary; the Redis script mirrors it
//! line for line.

use super::types::{RateLimitResult, RateLimitState};
use crate::config::models::rate_limit::RateLimitConfig;

/// Evaluate one request of `requested_tokens` against `state` at `now` (unix seconds).
///
/// Returns the state to persist and the admission result. While a cooldown is active the
/// request is denied and the state is returned unchanged, so a cooldown is never extended and
/// the violation counter never moves during one. The counter is monotonic: admissions do not
/// reset it, only key expiry does.
pub fn evaluate(
    state: RateLimitState,
    config: &RateLimitConfig,
    now: f64,
    requested_tokens: u32,
) -> (RateLimitState, RateLimitResult) {
    if state.in_cooldown(now) {
        let retry_after = (state.cooldown_until - now).ceil() as u64;
        let result = RateLimitResult::denied(
            whole_tokens(state.tokens),
            retry_after,
            state.violation_count,
        );
        return (state, result);
    }

    let mut next = state;
    let elapsed = (now - state.last_refill_at).max(0.0);
    let burst = f64::from(config.burst);
    next.tokens = (state.tokens + elapsed * config.refill_rate()).min(burst);
    // A clock behind the stored refill time must not rewind it
    next.last_refill_at = state.last_refill_at.max(now);

    let requested = f64::from(requested_tokens);
    if next.tokens >= requested {
        next.tokens -= requested;
        let result = RateLimitResult::allowed(whole_tokens(next.tokens), next.violation_count);
        return (next, result);
    }

    next.violation_count = next.violation_count.saturating_add(1);
    let cooldown = config.cooldown_for(next.violation_count);
    next.cooldown_until = now + cooldown as f64;
    let result = RateLimitResult::denied(
        whole_tokens(next.tokens),
        cooldown,
        next.violation_count,
    );
    (next, result)
}

/// Tokens reported to clients are truncated so capacity is never overstated
fn whole_tokens(tokens: f64) -> u64 {
    tokens.max(0.0).floor() as u64
}
