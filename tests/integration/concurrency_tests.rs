//! Concurrency tests
//!
//! Many tasks hammering one key must never be admitted more than the bucket holds.

#[cfg(test)]
mod tests {
    use crate::common::{fixtures::T0, search_config};
    use ratewarden::{KeyScope, MemoryRateLimitStore, RateLimitStore, derive_key};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_capacity_bound_under_contention() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let config = Arc::new(search_config());
        let key = Arc::new(derive_key(KeyScope::Ip, "search", "198.51.100.77").unwrap());
        let admitted = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let (store, config, key, admitted) = (
                Arc::clone(&store),
                Arc::clone(&config),
                Arc::clone(&key),
                Arc::clone(&admitted),
            );
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    let result = store.check_and_consume(&key, &config, T0, 1).await.unwrap();
                    if result.allowed {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), u64::from(config.burst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_single_violation_under_contention() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let config = Arc::new(search_config());
        let key = Arc::new(derive_key(KeyScope::User, "search", "user-9").unwrap());

        let mut handles = Vec::new();
        for _ in 0..50 {
            let (store, config, key) = (Arc::clone(&store), Arc::clone(&config), Arc::clone(&key));
            handles.push(tokio::spawn(async move {
                store.check_and_consume(&key, &config, T0, 1).await.unwrap()
            }));
        }

        let mut max_violations = 0;
        for handle in handles {
            max_violations = max_violations.max(handle.await.unwrap().violations);
        }
        // Every denial after the first lands inside its cooldown
        assert_eq!(max_violations, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_keys_do_not_interfere() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let config = Arc::new(search_config());

        let mut handles = Vec::new();
        for caller in 0..16 {
            let (store, config) = (Arc::clone(&store), Arc::clone(&config));
            handles.push(tokio::spawn(async move {
                let identifier = format!("10.1.0.{}", caller);
                let key = derive_key(KeyScope::Ip, "search", &identifier).unwrap();
                let mut admitted = 0;
                for _ in 0..30 {
                    if store.check_and_consume(&key, &config, T0, 1).await.unwrap().allowed {
                        admitted += 1;
                    }
                }
                admitted
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 25);
        }
        assert_eq!(store.len(), 16);
    }
}
