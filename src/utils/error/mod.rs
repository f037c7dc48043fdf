//! Error handling for the rate governor
//!
//! Runtime store failures are absorbed by the limiter (fail-open) and never reach this type's
//! HTTP mapping; what surfaces here is configuration, startup and introspection failures.

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{Result, WardenError};
