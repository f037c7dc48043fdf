//! HTTP middleware implementations

mod rate_limit;


pub use rate_limit::{RateLimitMiddleware, RateLimitMiddlewareService};
