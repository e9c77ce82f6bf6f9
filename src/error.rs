//! Error types shared by every pipeline stage

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes returned in JSON error bodies
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Crate-wide error type
#[derive(Debug, thiserror::Error)]
pub enum TruthLensError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream {service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Scrape failed for {url}: {reason}")]
    Scrape { url: String, reason: String },

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Circuit breaker is open: {0}")]
    CircuitOpen(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TruthLensError>;

impl From<serde_json::Error> for TruthLensError {
    fn from(e: serde_json::Error) -> Self {
        TruthLensError::Parse(e.to_string())
    }
}

impl From<config::ConfigError> for TruthLensError {
    fn from(e: config::ConfigError) -> Self {
        TruthLensError::Configuration(e.to_string())
    }
}

impl From<handlebars::RenderError> for TruthLensError {
    fn from(e: handlebars::RenderError) -> Self {
        TruthLensError::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for TruthLensError {
    fn from(e: handlebars::TemplateError) -> Self {
        TruthLensError::Template(e.to_string())
    }
}

impl TruthLensError {
    /// HTTP status this error maps to when it escapes a handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            TruthLensError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TruthLensError::Validation(_) => error_codes::VALIDATION_ERROR,
            _ => error_codes::INTERNAL_ERROR,
        }
    }
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for TruthLensError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ApiError::new(self.code(), self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = TruthLensError::Validation("claim cannot be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), error_codes::VALIDATION_ERROR);
    }

    #[test]
    fn test_upstream_maps_to_internal() {
        let err = TruthLensError::Upstream {
            service: "search",
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), error_codes::INTERNAL_ERROR);
        assert!(err.to_string().contains("503"));
    }
}
