//! HTTP response handling for errors

use super::types::WardenError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for WardenError {
    fn status_code(&self) -> StatusCode {
        match self {
            WardenError::Validation(_) => StatusCode::BAD_REQUEST,
            WardenError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            WardenError::Redis(_) | WardenError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            WardenError::Config(_) => ("CONFIG_ERROR", self.to_string()),
            WardenError::Validation(_) => ("VALIDATION_ERROR", self.to_string()),
            WardenError::Redis(_) => (
                "STORE_ERROR",
                "Rate limit store operation failed".to_string(),
            ),
            WardenError::Store(_) => ("STORE_ERROR", self.to_string()),
            WardenError::Timeout(_) => ("TIMEOUT", self.to_string()),
            _ => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail body
#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}
