//! End-to-end tests against a live Redis
//!
//! Ignored by default. Run with `REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored`.

pub mod redis_store_tests;
