//! Request-scoped errors and their HTTP rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::session::ConnectionFailure;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No upstream session could be established.
    #[error(transparent)]
    Connection(#[from] ConnectionFailure),

    /// Fetching from the upstream, or decoding what it returned, failed.
    #[error(transparent)]
    Upstream(#[from] garmin_connect_client::GarminError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
