//! Session endpoints

use axum::{extract::State, http::StatusCode, response::Json};

use crate::AppState;
use crate::error::AppError;
use crate::sync::IngestReport;

/// POST /sync/ingest
///
/// Runs bulk ingestion now. Responds 503 when the remote store is
/// unreachable; the cache keeps whatever it had.
pub async fn ingest(State(state): State<AppState>) -> Result<Json<IngestReport>, AppError> {
    Ok(Json(state.ingest.run().await?))
}

/// POST /session/clear
pub async fn clear_session(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.users.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
