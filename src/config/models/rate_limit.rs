//! Rate limiting configuration
//!
//! One [`RateLimitConfig`] per endpoint class, a route table mapping request paths to classes,
//! and the list of path prefixes that bypass rate limiting entirely.

use super::*;
use crate::config::validation::Validate;
use crate::utils::error::{Result, WardenError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token bucket parameters for one endpoint class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained requests allowed per `window`
    pub limit: u32,
    /// Bucket capacity
    pub burst: u32,
    /// Window in seconds over which `limit` applies
    pub window: u64,
    /// Cooldown ladder in seconds, indexed by violation count; the last entry repeats
    pub cooldown: Vec<u64>,
}

impl RateLimitConfig {
    /// Build a validated configuration
    pub fn new(limit: u32, burst: u32, window: u64, cooldown: Vec<u64>) -> Result<Self> {
        let config = Self {
            limit,
            burst,
            window,
            cooldown,
        };
        config.validate().map_err(WardenError::Config)?;
        Ok(config)
    }

    /// Tokens added per second
    pub fn refill_rate(&self) -> f64 {
        f64::from(self.limit) / self.window as f64
    }

    /// Cooldown applied on the `violations`-th consecutive violation (1-based)
    pub fn cooldown_for(&self, violations: u64) -> u64 {
        let index = violations.saturating_sub(1) as usize;
        self.cooldown
            .get(index)
            .or_else(|| self.cooldown.last())
            .copied()
            .unwrap_or(0)
    }

    /// Longest entry of the cooldown ladder
    pub fn max_cooldown(&self) -> u64 {
        self.cooldown.iter().copied().max().unwrap_or(0)
    }

    /// Expiry applied to a key in the shared store.
    ///
    /// Twice the longest of the window and the cooldown ladder, so an idle key can only expire
    /// once a fresh default bucket is indistinguishable from its stored state.
    pub fn key_ttl_secs(&self) -> u64 {
        self.window.max(self.max_cooldown()).saturating_mul(2).max(1)
    }

    /// Seconds until a bucket holding `tokens_remaining` is full again
    pub fn seconds_until_full(&self, tokens_remaining: u64) -> u64 {
        let missing = u64::from(self.burst).saturating_sub(tokens_remaining);
        if missing == 0 {
            return 0;
        }
        (missing as f64 / self.refill_rate()).ceil() as u64
    }
}

/// How a route rule is matched against a request path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Matches the path exactly or any path starting with it
    #[default]
    Prefix,
    /// Matches the path exactly
    Exact,
}

/// Maps a request path to an endpoint class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRule {
    pub path: String,
    pub class: String,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
}

impl RouteRule {
    pub fn prefix(path: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            class: class.into(),
            match_mode: MatchMode::Prefix,
        }
    }

    pub fn exact(path: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            class: class.into(),
            match_mode: MatchMode::Exact,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Upper bound on one store round-trip before failing open
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    /// Class for paths no route matches
    #[serde(default = "default_class_name")]
    pub default_class: String,
    /// Path prefixes never rate limited
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
    /// Bucket parameters per endpoint class
    #[serde(default = "default_classes")]
    pub classes: BTreeMap<String, RateLimitConfig>,
    /// Path to class table
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteRule>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            store_timeout_ms: default_store_timeout_ms(),
            default_class: default_class_name(),
            excluded_paths: default_excluded_paths(),
            classes: default_classes(),
            routes: default_routes(),
        }
    }
}

impl RateLimitSettings {
    /// Configuration of the class unmatched paths fall into
    pub fn default_class_config(&self) -> Option<&RateLimitConfig> {
        self.classes.get(&self.default_class)
    }
}

fn default_excluded_paths() -> Vec<String> {
    ["/health", "/docs", "/redoc", "/openapi.json", "/static", "/"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_classes() -> BTreeMap<String, RateLimitConfig> {
    let mut classes = BTreeMap::new();
    classes.insert(
        "search".to_string(),
        RateLimitConfig {
            limit: 100,
            burst: 25,
            window: 60,
            cooldown: vec![5, 10, 60, 300],
        },
    );
    classes.insert(
        "ai".to_string(),
        RateLimitConfig {
            limit: 30,
            burst: 5,
            window: 3600,
            cooldown: vec![30, 60, 300, 1800],
        },
    );
    classes.insert(
        "general".to_string(),
        RateLimitConfig {
            limit: 1000,
            burst: 100,
            window: 3600,
            cooldown: vec![10, 30, 300],
        },
    );
    classes
}

fn default_routes() -> Vec<RouteRule> {
    const SEARCH: &[&str] = &[
        "/food/search",
        "/food/details",
        "/recipes/search",
        "/recipes/random",
    ];
    const AI: &[&str] = &[
        "/gpt/analyze",
        "/gpt/chat",
        "/gpt/analyze-image",
        "/gpt/analyze-meal",
        "/deepseek/analyze",
        "/deepseek/nutrition-analysis",
        "/deepseek/chat",
        "/deepseek/chat-with-context",
        "/arli_ai/analyze",
    ];

    SEARCH
        .iter()
        .map(|path| RouteRule::prefix(*path, "search"))
        .chain(AI.iter().map(|path| RouteRule::prefix(*path, "ai")))
        .collect()
}
