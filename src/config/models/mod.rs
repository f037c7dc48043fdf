//! Configuration data models
//!
//! This module defines all configuration structures used by the governor and its HTTP server.

#![allow(missing_docs)]

pub mod logging;
pub mod rate_limit;
pub mod server;
pub mod storage;

pub use logging::*;
pub use rate_limit::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default Redis connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Default namespace prepended to every rate-limit key in the shared store
pub fn default_key_prefix() -> String {
    "rate_limit:".to_string()
}

/// Default upper bound on one store round-trip, in milliseconds
pub fn default_store_timeout_ms() -> u64 {
    250
}

/// Name of the class unmatched paths fall into
pub fn default_class_name() -> String {
    "general".to_string()
}

pub(crate) fn default_true() -> bool {
    true
}
