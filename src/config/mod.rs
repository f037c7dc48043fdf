//! Configuration management
//!
//! This module handles loading, validation, and management of the governor's configuration.
//! A broken configuration is fatal: [`Config::validate`] runs on every load path and the server
//! refuses to start rather than rate limit with nonsense parameters.

pub mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{Result, WardenError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Shared store configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await?;

        let config = Self::from_yaml(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Get Redis configuration
    pub fn redis(&self) -> &RedisConfig {
        &self.storage.redis
    }

    /// Get rate limiting configuration
    pub fn rate_limit(&self) -> &RateLimitSettings {
        &self.rate_limit
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.server
            .validate()
            .map_err(|e| WardenError::Config(format!("Server config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| WardenError::Config(format!("Logging config error: {}", e)))?;

        self.storage
            .validate()
            .map_err(|e| WardenError::Config(format!("Storage config error: {}", e)))?;

        self.rate_limit
            .validate()
            .map_err(|e| WardenError::Config(format!("Rate limit config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
