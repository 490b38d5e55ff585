//! Error types for the HTTP adapter

use docchat_application::GatewayError;
use thiserror::Error;

/// Result type alias for HTTP adapter operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// Errors that can occur when talking to the service over HTTP
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<HttpError> for GatewayError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Status {
                status,
                body,
                detail,
            } => GatewayError::Server {
                status,
                body,
                detail,
            },
            HttpError::Request(e) if e.is_timeout() => GatewayError::Timeout,
            HttpError::Request(e) if e.is_decode() => GatewayError::Malformed(e.to_string()),
            HttpError::Request(e) if e.is_body() => GatewayError::StreamInterrupted(e.to_string()),
            HttpError::Request(e) => GatewayError::Connection(e.to_string()),
            HttpError::Json(e) => GatewayError::Malformed(e.to_string()),
            e @ (HttpError::InvalidBaseUrl { .. } | HttpError::Client(_)) => {
                GatewayError::Connection(e.to_string())
            }
        }
    }
}
