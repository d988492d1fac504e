//! Error types for the RAG system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential or setting is absent
    #[error("Missing required configuration: {0}")]
    ConfigMissing(String),

    /// Configuration value is present but invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document could not be read or parsed
    #[error("Failed to load source '{path}': {message}")]
    SourceLoadFailed { path: String, message: String },

    /// Embedding service failure
    #[error("Embedding service error: {message}")]
    EmbeddingService { message: String, transient: bool },

    /// Generation service failure
    #[error("Generation service error: {message}")]
    GenerationService { message: String, transient: bool },

    /// Request rejected before reaching the pipeline
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a source load error
    pub fn source_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceLoadFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a non-retryable embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingService {
            message: message.into(),
            transient: false,
        }
    }

    /// Create a non-retryable generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationService {
            message: message.into(),
            transient: false,
        }
    }

    /// Create an embedding error from a failed HTTP exchange
    pub fn embedding_http(err: &reqwest::Error) -> Self {
        Self::EmbeddingService {
            message: err.to_string(),
            transient: is_transient_transport(err),
        }
    }

    /// Create a generation error from a failed HTTP exchange
    pub fn generation_http(err: &reqwest::Error) -> Self {
        Self::GenerationService {
            message: err.to_string(),
            transient: is_transient_transport(err),
        }
    }

    /// Create an embedding error from a non-success status
    pub fn embedding_status(status: reqwest::StatusCode, body: &str) -> Self {
        Self::EmbeddingService {
            message: format!("HTTP {} - {}", status, body),
            transient: is_transient_status(status),
        }
    }

    /// Create a generation error from a non-success status
    pub fn generation_status(status: reqwest::StatusCode, body: &str) -> Self {
        Self::GenerationService {
            message: format!("HTTP {} - {}", status, body),
            transient: is_transient_status(status),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Error::EmbeddingService { transient, .. }
            | Error::GenerationService { transient, .. } => *transient,
            Error::Http(err) => is_transient_transport(err),
            _ => false,
        }
    }
}

fn is_transient_transport(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    err.status().map(is_transient_status).unwrap_or(false)
}

fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::ConfigMissing(name) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "config_missing",
                format!("Missing required configuration: {}", name),
            ),
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone()),
            Error::SourceLoadFailed { path, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "source_load_failed",
                format!("Failed to load '{}': {}", path, message),
            ),
            Error::EmbeddingService { message, .. } => (
                StatusCode::BAD_GATEWAY,
                "embedding_service_error",
                message.clone(),
            ),
            Error::GenerationService { message, .. } => (
                StatusCode::BAD_GATEWAY,
                "generation_service_error",
                message.clone(),
            ),
            Error::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            Error::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg.clone())
            }
            Error::VectorIndex(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "vector_index_error",
                msg.clone(),
            ),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let err = Error::embedding_status(reqwest::StatusCode::SERVICE_UNAVAILABLE, "busy");
        assert!(err.is_transient());

        let err = Error::generation_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.is_transient());

        let err = Error::generation_status(reqwest::StatusCode::UNAUTHORIZED, "bad key");
        assert!(!err.is_transient());

        assert!(!Error::invalid_request("empty").is_transient());
        assert!(!Error::ConfigMissing("GROQ_API_KEY".into()).is_transient());
    }

    #[test]
    fn test_status_mapping() {
        let resp = Error::invalid_request("question is empty").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = Error::generation("boom").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = Error::embedding("boom").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = Error::PayloadTooLarge("too big".into()).into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
