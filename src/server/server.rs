//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::core::rate_limit::{Clock, SystemClock};
use crate::server::middleware::RateLimitMiddleware;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{Result, WardenError};
use actix_web::{App, HttpServer as ActixHttpServer, web};
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = crate::storage::build_rate_limit_store(&config.storage, Arc::clone(&clock))?;
        let state = AppState::build(config.clone(), store, clock)?;

        Ok(Self {
            config: config.server.clone(),
            state,
        })
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let rate_limit = RateLimitMiddleware::new(Arc::clone(&state.admission));

        App::new()
            .app_data(state)
            .wrap(rate_limit)
            .wrap(TracingLogger::default())
            .configure(routes::health::configure_routes)
            .default_service(web::to(routes::not_found))
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let port = self.config.port;

        info!(
            backend = self.state.admission.limiter().backend_name(),
            enabled = self.state.admission.is_enabled(),
            "Starting HTTP server on {}",
            bind_addr
        );

        let state = web::Data::new(self.state);
        let mut server = ActixHttpServer::new(move || Self::create_app(state.clone()));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr, port))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| WardenError::server(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Format a user-friendly error message for port binding failures
    pub(crate) fn format_bind_error(
        error: std::io::Error,
        bind_addr: &str,
        port: u16,
    ) -> WardenError {
        match error.kind() {
            ErrorKind::AddrInUse => WardenError::server(format!(
                "Port {} is already in use; stop the other process or set RATEWARDEN_PORT ({})",
                port,
                port.saturating_add(1)
            )),
            ErrorKind::PermissionDenied => WardenError::server(format!(
                "Permission denied for port {}; use a port >= 1024",
                port
            )),
            _ => WardenError::server(format!("Failed to bind to {}: {}", bind_addr, error)),
        }
    }
}
