//! Helper functions for creating specific error types

use super::types::WardenError;

impl WardenError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Server(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error comes from the shared store and should be absorbed (fail-open)
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            WardenError::Redis(_) | WardenError::Store(_) | WardenError::Timeout(_)
        )
    }
}
