//! Redis connection management
//!
//! One multiplexed [`ConnectionManager`] is shared by every request of the process. It is
//! established on first use rather than at startup, and reconnects on its own after failures.

use crate::config::RedisConfig;
use crate::utils::error::{Result, WardenError};
use redis::Client;
use redis::aio::ConnectionManager;
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Redis connection pool
pub struct RedisPool {
    /// Redis client
    pub(crate) client: Client,
    /// Connection manager, established on first use
    pub(crate) connection_manager: OnceCell<ConnectionManager>,
    /// Configuration
    pub(crate) config: RedisConfig,
}

impl RedisPool {
    /// Create a pool; parses the URL but does not connect
    pub fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(WardenError::Redis)?;

        Ok(Self {
            client,
            connection_manager: OnceCell::new(),
            config: config.clone(),
        })
    }

    /// Get a handle to the shared connection, connecting if needed.
    ///
    /// Concurrent first callers race on one initialization; a failed attempt leaves the cell
    /// empty so the next call retries.
    pub async fn get_connection(&self) -> Result<ConnectionManager> {
        let timeout = Duration::from_secs(self.config.connection_timeout);
        let manager = self
            .connection_manager
            .get_or_try_init(|| async {
                info!(
                    "Connecting to Redis at {}",
                    Self::sanitize_url(&self.config.url)
                );
                match tokio::time::timeout(timeout, ConnectionManager::new(self.client.clone()))
                    .await
                {
                    Ok(manager) => manager.map_err(WardenError::Redis),
                    Err(_) => Err(WardenError::timeout(format!(
                        "Redis connection not established within {}s",
                        self.config.connection_timeout
                    ))),
                }
            })
            .await?;
        Ok(manager.clone())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");
        let mut conn = self.get_connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(WardenError::Redis)?;

        debug!("Redis health check passed");
        Ok(())
    }

    /// Whether a connection has been established
    pub fn is_connected(&self) -> bool {
        self.connection_manager.initialized()
    }

    /// Namespace prepended to rate limit keys
    pub fn key_prefix(&self) -> &str {
        &self.config.key_prefix
    }

    /// Full store key for a rate limit key
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}

impl fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &Self::sanitize_url(&self.config.url))
            .field("connected", &self.is_connected())
            .field("key_prefix", &self.config.key_prefix)
            .finish()
    }
}
