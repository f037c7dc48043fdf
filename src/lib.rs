//! # ratewarden
//!
//! A distributed request-rate governor for actix-web services.
//!
//! Each request is classified into an endpoint class, attributed to a caller (authenticated
//! identity or network address) and checked against a token bucket shared through Redis by
//! every server process. Callers that exhaust their bucket are refused for an escalating
//! cooldown. Store outages fail open.
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use ratewarden::{Config, HttpServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config/ratewarden.yaml").await?;
//!     HttpServer::new(&config).await?.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! Applications with their own routes wrap them in
//! [`server::middleware::RateLimitMiddleware`] built from an [`AdmissionControl`].

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use core::rate_limit::{
    AdmissionControl, AdmissionOutcome, AuthenticatedPrincipal, CallerId, Classifier, Clock,
    KeyScope, ManualClock, RateLimitKey, RateLimitResult, RateLimitState, RateLimiter,
    SystemClock, derive_key, evaluate,
};
pub use server::middleware::RateLimitMiddleware;
pub use server::server::HttpServer;
pub use storage::rate_limit::{
    MemoryRateLimitStore, RateLimitStore, RedisRateLimitStore, StoreHealth,
};
pub use utils::error::{Result, WardenError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
