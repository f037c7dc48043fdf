//! Rate limit configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.limit == 0 {
            return Err("limit must be greater than 0".to_string());
        }

        if self.window == 0 {
            return Err("window must be greater than 0 seconds".to_string());
        }

        // One request consumes one token, so a bucket must hold at least one.
        if self.burst == 0 {
            return Err("burst must be at least 1".to_string());
        }

        if self.cooldown.is_empty() {
            return Err("cooldown ladder must not be empty".to_string());
        }

        if self.cooldown.contains(&0) {
            return Err("cooldown ladder entries must be positive".to_string());
        }

        if self.cooldown.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err("cooldown ladder must be non-decreasing".to_string());
        }

        Ok(())
    }
}

impl Validate for RateLimitSettings {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating rate limit configuration");

        if self.store_timeout_ms == 0 {
            return Err("store_timeout_ms must be greater than 0".to_string());
        }

        for (name, class) in &self.classes {
            if name.is_empty() {
                return Err("endpoint class names cannot be empty".to_string());
            }
            class
                .validate()
                .map_err(|e| format!("class '{}': {}", name, e))?;
        }

        if !self.classes.contains_key(&self.default_class) {
            return Err(format!(
                "default class '{}' has no configuration",
                self.default_class
            ));
        }

        for route in &self.routes {
            if !route.path.starts_with('/') {
                return Err(format!("route path '{}' must start with '/'", route.path));
            }
            if !self.classes.contains_key(&route.class) {
                return Err(format!(
                    "route '{}' refers to unknown class '{}'",
                    route.path, route.class
                ));
            }
        }

        if let Some(path) = self.excluded_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(format!("excluded path '{}' must start with '/'", path));
        }

        Ok(())
    }
}
