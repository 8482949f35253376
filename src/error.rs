//! Error types for goodfood-sync
//!
//! Adapters and services return `AppError`. The sync engine absorbs
//! remote-side errors on its degraded paths and only lets local-store
//! faults and failed bulk ingestion through.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identifier already taken in one of the stores (409)
    #[error("Identifier already exists: {0}")]
    Conflict(String),

    /// Local database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed (500)
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Local store fault outside of SQLite (500)
    #[error("Local store error: {0}")]
    LocalStore(String),

    /// HTTP client error talking to the remote store (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Remote store rejected or could not serve the request (502)
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Document (de)serialization error (500)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Full-collection refresh could not complete (503)
    #[error("Bulk ingestion failed: {0}")]
    BulkIngest(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error originated on the remote side of the sync boundary.
    pub fn is_remote(&self) -> bool {
        matches!(self, AppError::HttpClient(_) | AppError::Remote(_))
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::Validation(_) => "validation",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) | AppError::Migration(_) => "database",
            AppError::LocalStore(_) => "local_store",
            AppError::HttpClient(_) => "http_client",
            AppError::Remote(_) => "remote",
            AppError::Serialization(_) => "serialization",
            AppError::BulkIngest(_) => "bulk_ingest",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Map each error variant to a status code and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::HttpClient(_) | AppError::Remote(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::BulkIngest(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Database(_) | AppError::Migration(_) | AppError::LocalStore(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Local store error".to_string(),
            ),
            AppError::Serialization(_) | AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.error_type()])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_classification() {
        assert!(AppError::Remote("down".to_string()).is_remote());
        assert!(!AppError::LocalStore("disk full".to_string()).is_remote());
        assert!(!AppError::NotFound.is_remote());
    }

    #[test]
    fn bulk_ingest_maps_to_service_unavailable() {
        let response = AppError::BulkIngest("users: offline".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn local_faults_hide_details() {
        let response = AppError::LocalStore("corrupt page".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
