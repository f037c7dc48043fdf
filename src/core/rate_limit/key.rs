//! Rate limit key derivation
//!
//! Raw identifiers never reach the store: only a truncated SHA-256 digest does. Two identifiers
//! colliding on the prefix share a bucket, which can only make limiting stricter.

use super::types::{KeyScope, RateLimitKey};
use crate::utils::error::{Result, WardenError};
use sha2::{Digest, Sha256};

/// Hex characters of the identifier digest kept in a key
pub const DIGEST_PREFIX_LEN: usize = 16;

/// Derive the key `{scope}:{class}:{digest}` for `identifier` on `endpoint_class`
pub fn derive_key(scope: KeyScope, endpoint_class: &str, identifier: &str) -> Result<RateLimitKey> {
    if identifier.is_empty() {
        return Err(WardenError::validation(
            "Rate limit identifier must not be empty",
        ));
    }
    if endpoint_class.is_empty() {
        return Err(WardenError::validation("Endpoint class must not be empty"));
    }

    let digest = hex::encode(Sha256::digest(identifier.as_bytes()));
    Ok(RateLimitKey::new(format!(
        "{}:{}:{}",
        scope,
        endpoint_class,
        &digest[..DIGEST_PREFIX_LEN]
    )))
}
