//! Core error types

use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, WardenError>;

/// Main error type for the rate governor
#[derive(Error, Debug)]
pub enum WardenError {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Rate-limit store errors that are not raw Redis errors
    #[error("Store error: {0}")]
    Store(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
