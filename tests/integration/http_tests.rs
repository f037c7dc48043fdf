//! HTTP integration tests against the full application

#[cfg(test)]
mod tests {
    use crate::common::{fixtures::T0, test_config};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use async_trait::async_trait;
    use ratewarden::config::models::rate_limit::RateLimitConfig;
    use ratewarden::server::state::AppState;
    use ratewarden::{
        HttpServer, ManualClock, MemoryRateLimitStore, RateLimitKey, RateLimitResult,
        RateLimitStore, StoreHealth,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts store round-trips, delegating to an in-process store
    #[derive(Debug, Default)]
    struct CountingStore {
        inner: MemoryRateLimitStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateLimitStore for CountingStore {
        async fn check_and_consume(
            &self,
            key: &RateLimitKey,
            config: &RateLimitConfig,
            now: f64,
            requested_tokens: u32,
        ) -> ratewarden::Result<RateLimitResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner
                .check_and_consume(key, config, now, requested_tokens)
                .await
        }

        async fn health_check(&self) -> ratewarden::Result<StoreHealth> {
            self.inner.health_check().await
        }

        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    /// Never answers within the configured timeout
    #[derive(Debug)]
    struct StalledStore;

    #[async_trait]
    impl RateLimitStore for StalledStore {
        async fn check_and_consume(
            &self,
            _key: &RateLimitKey,
            _config: &RateLimitConfig,
            _now: f64,
            _requested_tokens: u32,
        ) -> ratewarden::Result<RateLimitResult> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RateLimitResult::denied(0, 60, 9))
        }

        async fn health_check(&self) -> ratewarden::Result<StoreHealth> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(StoreHealth {
                backend: "stalled",
                connected: true,
                script_ready: true,
                error: None,
            })
        }

        fn backend_name(&self) -> &'static str {
            "stalled"
        }
    }

    fn app_state(store: Arc<dyn RateLimitStore>) -> web::Data<AppState> {
        let mut config = test_config();
        config.rate_limit.store_timeout_ms = 20;
        let state = AppState::build(config, store, Arc::new(ManualClock::new(T0))).unwrap();
        web::Data::new(state)
    }

    #[actix_web::test]
    async fn test_excluded_path_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let app = test::init_service(HttpServer::create_app(app_state(store.clone()))).await;

        for _ in 0..1000 {
            let req = test::TestRequest::get()
                .uri("/health")
                .insert_header(("x-forwarded-for", "203.0.113.5"))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert!(res.headers().get("x-ratelimit-limit").is_none());
        }

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn test_search_burst_then_rejection() {
        let store = Arc::new(CountingStore::default());
        let app = test::init_service(HttpServer::create_app(app_state(store.clone()))).await;

        for expected_remaining in (0..25).rev() {
            let req = test::TestRequest::get()
                .uri("/food/search?q=apple")
                .insert_header(("x-forwarded-for", "203.0.113.5"))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_ne!(res.status(), StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(
                res.headers().get("x-ratelimit-remaining").unwrap(),
                expected_remaining.to_string().as_str()
            );
        }

        let req = test::TestRequest::get()
            .uri("/food/search?q=apple")
            .insert_header(("x-forwarded-for", "203.0.113.5"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers().get("retry-after").unwrap(), "5");

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["type"], "rate_limit_exceeded");
        assert_eq!(body["retry_after"], 5);
        assert_eq!(body["violations"], 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 26);
    }

    #[actix_web::test]
    async fn test_stalled_store_fails_open() {
        let app =
            test::init_service(HttpServer::create_app(app_state(Arc::new(StalledStore)))).await;

        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/gpt/chat")
                .insert_header(("authorization", "Bearer stalled-user"))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_ne!(res.status(), StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(res.headers().get("x-ratelimit-limit").unwrap(), "30");
            assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), "5");
        }
    }

    #[actix_web::test]
    async fn test_stalled_store_reports_degraded() {
        let app =
            test::init_service(HttpServer::create_app(app_state(Arc::new(StalledStore)))).await;

        let req = test::TestRequest::get()
            .uri("/health/rate-limiting")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["status"], "degraded");
        assert_eq!(body["data"]["store"]["connected"], false);
    }
}
