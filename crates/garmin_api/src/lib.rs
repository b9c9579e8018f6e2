//! HTTP facade over a Garmin Connect account.
//!
//! Two read endpoints, `/api/garmin/health` and `/api/garmin/runs`, share one
//! lazily created upstream session ([`session::SessionManager`]) and translate
//! raw upstream records through [`mapper`].

use std::sync::Arc;

use axum::{Router, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod error;
pub mod mapper;
pub mod routes;
pub mod session;
mod test_utils;

pub use error::{ApiError, ApiResult};
pub use session::{ConnectionFailure, SessionManager};

pub struct AppState {
    pub sessions: SessionManager,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(sessions: SessionManager, metrics: PrometheusHandle) -> Self {
        Self { sessions, metrics }
    }

    /// State with a detached Prometheus recorder, so tests never touch the
    /// global one.
    #[cfg(test)]
    pub(crate) fn for_tests(sessions: SessionManager) -> Self {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        Self::new(sessions, recorder.handle())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::readiness))
        .route("/metrics", get(routes::metrics_endpoint))
        .route("/api/garmin/health", get(routes::health_snapshot))
        .route("/api/garmin/runs", get(routes::runs))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
