//! Configuration loading utilities
//!
//! Resolution order: YAML file (or built-in defaults when the file does not exist), then
//! environment overrides, then validation.

use super::Config;
use crate::utils::error::{Result, WardenError};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

impl Config {
    /// Load the effective configuration for the server
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::from_file(path).await?
        } else {
            warn!(
                "Configuration file {:?} not found, using built-in defaults",
                path
            );
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            classes = config.rate_limit.classes.len(),
            routes = config.rate_limit.routes.len(),
            redis_enabled = config.storage.redis.enabled,
            "Configuration ready"
        );
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RATEWARDEN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RATEWARDEN_PORT") {
            self.server.port = parse_var("RATEWARDEN_PORT", &port)?;
        }
        if let Some(workers) = lookup("RATEWARDEN_WORKERS") {
            self.server.workers = Some(parse_var("RATEWARDEN_WORKERS", &workers)?);
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.storage.redis.url = url;
        }
        if let Some(enabled) = lookup("REDIS_ENABLED") {
            self.storage.redis.enabled = parse_var("REDIS_ENABLED", &enabled)?;
        }
        if let Some(enabled) = lookup("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = parse_var("RATE_LIMIT_ENABLED", &enabled)?;
        }
        if let Some(timeout) = lookup("RATE_LIMIT_STORE_TIMEOUT_MS") {
            self.rate_limit.store_timeout_ms = parse_var("RATE_LIMIT_STORE_TIMEOUT_MS", &timeout)?;
        }

        debug!("Environment overrides applied");
        Ok(())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| WardenError::Config(format!("Invalid {}: {}", name, e)))
}
