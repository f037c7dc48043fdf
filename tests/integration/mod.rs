//! Integration tests for ratewarden
//!
//! These tests run the governor through its public entry points on the in-process store.

pub mod concurrency_tests;
pub mod http_tests;
pub mod scenario_tests;
