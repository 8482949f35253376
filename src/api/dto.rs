//! API response DTOs
//!
//! Envelopes that expose the sync engine's tagged results to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::sync::{Fetched, Origin, Outcome};

/// Read response: the value and where it came from
#[derive(Debug, Clone, Serialize)]
pub struct ReadResponse<T> {
    pub data: T,
    pub origin: Origin,
}

impl<T> From<Fetched<T>> for ReadResponse<T> {
    fn from(fetched: Fetched<T>) -> Self {
        Self {
            data: fetched.value,
            origin: fetched.origin,
        }
    }
}

/// Write response: the stored value and whether remote accepted it
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse<T> {
    pub data: T,
    pub remote_synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

impl<T> From<Outcome<T>> for WriteResponse<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Synced(data) => Self {
                data,
                remote_synced: true,
                remote_error: None,
            },
            Outcome::Partial {
                value,
                remote_error,
            } => Self {
                data: value,
                remote_synced: false,
                remote_error: Some(remote_error),
            },
        }
    }
}

/// 200 when both stores agree, 202 when only the local leg completed.
impl<T: Serialize> IntoResponse for WriteResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.remote_synced {
            StatusCode::OK
        } else {
            StatusCode::ACCEPTED
        };
        (status, Json(self)).into_response()
    }
}

/// `?q=` for offline search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// `?prefix=` for remote prefix search
#[derive(Debug, Deserialize)]
pub struct PrefixParams {
    #[serde(default)]
    pub prefix: String,
}
