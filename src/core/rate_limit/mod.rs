//! Distributed rate limiting
//!
//! Token buckets with fractional refill and an escalating cooldown ladder, evaluated
//! atomically per key inside a shared store.
//!
//! ## Module Structure
//!
//! - `governor` - The admission algorithm, pure over `(state, config, now)`
//! - `key` - Privacy-preserving store keys
//! - `classifier` - Request path to endpoint class
//! - `identity` - Caller identification
//! - `limiter` - Bounded store calls with fail-open
//! - `admission` - The per-request decision used by the HTTP middleware

mod admission;
mod classifier;
mod clock;
pub mod governor;
mod identity;
mod key;
mod limiter;
mod types;

pub use admission::{AdmissionControl, AdmissionOutcome};
pub use classifier::{Classifier, EndpointClass};
pub use clock::{Clock, ManualClock, SystemClock};
pub use governor::evaluate;
pub use identity::{
    AddressSource, AuthenticatedPrincipal, CallerContext, CallerId, CallerIdentifier,
    IdentitySource,
};
pub use key::{DIGEST_PREFIX_LEN, derive_key};
pub use limiter::{DEFAULT_REQUESTED_TOKENS, RateLimiter};
pub use types::{KeyScope, RateLimitKey, RateLimitResult, RateLimitState};
