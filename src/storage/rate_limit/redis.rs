//! Redis-backed rate limit store
//!
//! The read-modify-write runs inside Redis as a Lua script, which Redis executes atomically,
//! so concurrent callers across processes are serialized per key without any client-side
//! locking. The script mirrors [`crate::core::rate_limit::governor::evaluate`].
//!
//! The script is loaded once per process and then run by SHA; a server that lost its script
//! cache gets the source again through EVAL.

use super::{RateLimitStore, StoreHealth};
use crate::config::models::rate_limit::RateLimitConfig;
use crate::core::rate_limit::{RateLimitKey, RateLimitResult};
use crate::storage::redis::RedisPool;
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{ErrorKind, RedisResult, Script};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

const TOKEN_BUCKET_SCRIPT: &str = include_str!("token_bucket.lua");

/// Rate limit store shared by every process connected to the same Redis
pub struct RedisRateLimitStore {
    pool: Arc<RedisPool>,
    script: Script,
    /// Set once the script has been loaded into the script cache by this process
    script_sha: OnceCell<String>,
}

impl RedisRateLimitStore {
    pub fn new(pool: Arc<RedisPool>) -> Self {
        Self {
            pool,
            script: Script::new(TOKEN_BUCKET_SCRIPT),
            script_sha: OnceCell::new(),
        }
    }

    /// SHA1 of the evaluation script
    pub fn script_hash(&self) -> &str {
        self.script.get_hash()
    }

    /// SHA of the script in the Redis script cache, loading it once per process.
    ///
    /// Safe under concurrent first use: SCRIPT LOAD is idempotent and only one caller's
    /// result is kept.
    async fn script_sha(&self, conn: &ConnectionManager) -> Result<&str> {
        let sha = self
            .script_sha
            .get_or_try_init(|| async {
                let mut conn = conn.clone();
                let sha: String = self
                    .script
                    .prepare_invoke()
                    .load_async(&mut conn)
                    .await
                    .map_err(WardenError::Redis)?;
                info!("Loaded rate limit script {}", sha);
                Ok::<_, WardenError>(sha)
            })
            .await?;
        Ok(sha.as_str())
    }
}

/// Script arguments in the order `token_bucket.lua` reads them
fn script_args(config: &RateLimitConfig, now: f64, requested_tokens: u32) -> Vec<String> {
    let mut args = vec![
        config.refill_rate().to_string(),
        config.burst.to_string(),
        now.to_string(),
        requested_tokens.to_string(),
        config.key_ttl_secs().to_string(),
    ];
    args.extend(config.cooldown.iter().map(|secs| secs.to_string()));
    args
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn check_and_consume(
        &self,
        key: &RateLimitKey,
        config: &RateLimitConfig,
        now: f64,
        requested_tokens: u32,
    ) -> Result<RateLimitResult> {
        let mut conn = self.pool.get_connection().await?;
        let sha = self.script_sha(&conn).await?;
        let store_key = self.pool.namespaced(key.as_str());
        let args = script_args(config, now, requested_tokens);

        let evalsha: RedisResult<Vec<i64>> = redis::cmd("EVALSHA")
            .arg(sha)
            .arg(1)
            .arg(&store_key)
            .arg(&args)
            .query_async(&mut conn)
            .await;
        let reply = match evalsha {
            Ok(reply) => reply,
            Err(e) if e.kind() == ErrorKind::NoScriptError => {
                // Script cache flushed or Redis restarted; EVAL caches it again
                warn!("Rate limit script missing from Redis, evaluating source");
                redis::cmd("EVAL")
                    .arg(TOKEN_BUCKET_SCRIPT)
                    .arg(1)
                    .arg(&store_key)
                    .arg(&args)
                    .query_async(&mut conn)
                    .await
                    .map_err(WardenError::Redis)?
            }
            Err(e) => return Err(WardenError::Redis(e)),
        };

        let result = RateLimitResult::from_script_reply(&reply)?;
        debug!(
            allowed = result.allowed,
            tokens_remaining = result.tokens_remaining,
            violations = result.violations,
            "Rate limit script evaluated"
        );
        Ok(result)
    }

    async fn health_check(&self) -> Result<StoreHealth> {
        if let Err(e) = self.pool.health_check().await {
            return Ok(StoreHealth {
                backend: self.backend_name(),
                connected: false,
                script_ready: false,
                error: Some(e.to_string()),
            });
        }

        let mut conn = self.pool.get_connection().await?;
        let exists: Vec<i64> = redis::cmd("SCRIPT")
            .arg("EXISTS")
            .arg(self.script_hash())
            .query_async(&mut conn)
            .await
            .map_err(WardenError::Redis)?;

        let mut health = StoreHealth {
            backend: self.backend_name(),
            connected: true,
            script_ready: exists.first() == Some(&1),
            error: None,
        };
        if !health.script_ready {
            match self.script.prepare_invoke().load_async(&mut conn).await {
                Ok(sha) => {
                    info!("Loaded rate limit script {} during health check", sha);
                    health.script_ready = true;
                }
                Err(e) => health.error = Some(e.to_string()),
            }
        }
        Ok(health)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

impl fmt::Debug for RedisRateLimitStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRateLimitStore")
            .field("pool", &self.pool)
            .field("script", &self.script_hash())
            .field("script_loaded", &self.script_sha.initialized())
            .finish()
    }
}
