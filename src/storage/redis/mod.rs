//! Redis connectivity
//!
//! ## Module Structure
//!
//! - `pool` - Lazily connected, self-reconnecting connection manager and health checks
//! - `tests` - Module tests

mod pool;

pub use pool::RedisPool;
