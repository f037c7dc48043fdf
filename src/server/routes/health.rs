//! Health check and introspection endpoints
//!
//! Everything here sits under `/health`, which the default configuration excludes from rate
//! limiting.

use crate::config::models::rate_limit::{RateLimitConfig, RouteRule};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::storage::rate_limit::StoreHealth;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/health")
            .route("", web::get().to(health_check))
            .route("/rate-limiting", web::get().to(rate_limiting_health))
            .route("/rate-limits", web::get().to(rate_limits)),
    );
}

/// Health status
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: Cow<'static, str>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: Cow<'static, str>,
}

/// Rate limiting subsystem health
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitingHealth {
    /// `healthy`, or `degraded` when the store is unreachable and requests are failing open
    pub status: &'static str,
    pub enabled: bool,
    pub store: StoreHealth,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Effective rate limiting configuration
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitsView<'a> {
    pub enabled: bool,
    pub default_class: &'a str,
    pub excluded_paths: &'a [String],
    pub classes: &'a BTreeMap<String, RateLimitConfig>,
    pub routes: &'a [RouteRule],
}

/// Basic health check endpoint
///
/// Liveness only; it does not touch the rate limit store.
pub async fn health_check() -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let health_status = HealthStatus {
        status: Cow::Borrowed("healthy"),
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(health_status)))
}

/// Rate limit store health.
///
/// Always 200: an unhealthy store means requests are admitted without limiting, not that the
/// service is down.
async fn rate_limiting_health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Rate limiting health check requested");

    let store = state.admission.limiter().health().await;
    let status = if store.healthy() {
        "healthy"
    } else {
        warn!(
            backend = store.backend,
            error = store.error.as_deref().unwrap_or("script not loaded"),
            "Rate limit store degraded"
        );
        "degraded"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(RateLimitingHealth {
        status,
        enabled: state.admission.is_enabled(),
        store,
        timestamp: chrono::Utc::now(),
    })))
}

async fn rate_limits(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let settings = &state.config.rate_limit;
    Ok(HttpResponse::Ok().json(ApiResponse::success(RateLimitsView {
        enabled: settings.enabled,
        default_class: &settings.default_class,
        excluded_paths: &settings.excluded_paths,
        classes: &settings.classes,
        routes: &settings.routes,
    })))
}
