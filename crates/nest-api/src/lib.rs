//! nest-api — HTTP routes served by the exporter.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition |
//! | GET | `/` | 302 redirect to `/metrics` |

pub mod handlers;

use axum::Router;
use axum::routing::get;
use nest_metrics::NestMetrics;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub metrics: NestMetrics,
}

/// Build the exporter router.
pub fn build_router(metrics: NestMetrics) -> Router {
    Router::new()
        .route("/", get(handlers::root_redirect))
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(ApiState { metrics })
}
