//! Redis store tests
//!
//! Each test namespaces its keys under a fresh prefix so runs never share bucket state.

#[cfg(test)]
mod tests {
    use crate::common::{ai_config, fixtures::T0, search_config};
    use crate::skip_without_env;
    use ratewarden::config::RedisConfig;
    use ratewarden::storage::redis::RedisPool;
    use ratewarden::{KeyScope, RateLimitStore, RedisRateLimitStore, derive_key};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn pool() -> Arc<RedisPool> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL").unwrap(),
            enabled: true,
            connection_timeout: 5,
            key_prefix: format!(
                "rate_limit_e2e:{}:{}:",
                std::process::id(),
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ),
        };
        Arc::new(RedisPool::new(&config).unwrap())
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_burst_and_cooldown() {
        skip_without_env!("REDIS_URL");
        let store = RedisRateLimitStore::new(pool());
        let config = search_config();
        let key = derive_key(KeyScope::Ip, "search", "192.0.2.10").unwrap();

        for expected in (0..25).rev() {
            let result = store.check_and_consume(&key, &config, T0, 1).await.unwrap();
            assert!(result.allowed);
            assert_eq!(result.tokens_remaining, expected);
        }

        let denied = store.check_and_consume(&key, &config, T0, 1).await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, 5);
        assert_eq!(denied.violations, 1);

        // Inside the cooldown the count stays put and the retry shrinks
        let again = store.check_and_consume(&key, &config, T0 + 2.5, 1).await.unwrap();
        assert!(!again.allowed);
        assert_eq!(again.retry_after, 3);
        assert_eq!(again.violations, 1);

        let readmitted = store.check_and_consume(&key, &config, T0 + 6.0, 1).await.unwrap();
        assert!(readmitted.allowed);
        assert_eq!(readmitted.violations, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    #[ignore]
    async fn test_redis_atomic_under_contention() {
        skip_without_env!("REDIS_URL");
        let store = Arc::new(RedisRateLimitStore::new(pool()));
        let config = Arc::new(search_config());
        let key = Arc::new(derive_key(KeyScope::Ip, "search", "192.0.2.11").unwrap());
        let admitted = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..40 {
            let (store, config, key, admitted) = (
                Arc::clone(&store),
                Arc::clone(&config),
                Arc::clone(&key),
                Arc::clone(&admitted),
            );
            handles.push(tokio::spawn(async move {
                for _ in 0..5 {
                    if store.check_and_consume(&key, &config, T0, 1).await.unwrap().allowed {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_key_expiry_is_set() {
        skip_without_env!("REDIS_URL");
        let pool = pool();
        let store = RedisRateLimitStore::new(Arc::clone(&pool));
        let config = ai_config();
        let key = derive_key(KeyScope::User, "ai", "e2e-user").unwrap();

        store.check_and_consume(&key, &config, T0, 1).await.unwrap();

        let mut conn = pool.get_connection().await.unwrap();
        let ttl: i64 = redis::cmd("TTL")
            .arg(pool.namespaced(key.as_str()))
            .query_async(&mut conn)
            .await
            .unwrap();
        assert!(ttl > 0 && ttl <= config.key_ttl_secs() as i64);

        let violations: i64 = redis::cmd("HGET")
            .arg(pool.namespaced(key.as_str()))
            .arg("violations")
            .query_async(&mut conn)
            .await
            .unwrap();
        assert_eq!(violations, 0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_recovers_from_script_flush() {
        skip_without_env!("REDIS_URL");
        let pool = pool();
        let store = RedisRateLimitStore::new(Arc::clone(&pool));
        let config = search_config();
        let key = derive_key(KeyScope::Ip, "search", "192.0.2.12").unwrap();

        assert!(store.check_and_consume(&key, &config, T0, 1).await.unwrap().allowed);

        let mut conn = pool.get_connection().await.unwrap();
        let _: () = redis::cmd("SCRIPT")
            .arg("FLUSH")
            .query_async(&mut conn)
            .await
            .unwrap();

        let result = store.check_and_consume(&key, &config, T0, 1).await.unwrap();
        assert!(result.allowed);
        assert_eq!(result.tokens_remaining, 23);
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_health_loads_script() {
        skip_without_env!("REDIS_URL");
        let pool = pool();
        let store = RedisRateLimitStore::new(Arc::clone(&pool));

        let mut conn = pool.get_connection().await.unwrap();
        let _: () = redis::cmd("SCRIPT")
            .arg("FLUSH")
            .query_async(&mut conn)
            .await
            .unwrap();

        let health = store.health_check().await.unwrap();
        assert!(health.connected);
        assert!(health.script_ready);
        assert!(health.healthy());
    }
}
