//! Route handlers.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::ApiState;

pub const METRICS_PATH: &str = "/metrics";

const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> Response {
    match state.metrics.render().await {
        Ok(body) => {
            debug!(bytes = body.len(), "metrics scraped");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /
///
/// Redirects to the scrape endpoint with a plain 302.
pub async fn root_redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, METRICS_PATH)])
}
