//! Prometheus metrics endpoint
//!
//! Cache hit ratio, degraded reads and remote failures in text format.

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, TextEncoder};

use crate::metrics::REGISTRY;

async fn render_metrics() -> Response {
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&REGISTRY.gather()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            body,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// `GET /metrics`, mountable on any router state.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(render_metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CACHE_HITS_TOTAL, init_metrics};

    #[tokio::test]
    async fn exposes_registered_counters() {
        init_metrics();
        CACHE_HITS_TOTAL.with_label_values(&["recipes"]).inc();

        let response = render_metrics().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("cache_hits_total"));
    }
}
