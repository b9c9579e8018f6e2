use std::sync::Arc;

use axum::debug_handler;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use garmin_connect_client::utils::today_local;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::mapper::{HealthSnapshot, RunSummary, to_health_snapshot, to_run_summaries};

/// Fixed window of the activity list inspected for runs.
pub const RUNS_OFFSET: u32 = 0;
pub const RUNS_LIMIT: u32 = 20;

fn fetch_failed(endpoint: &'static str, err: garmin_connect_client::GarminError) -> ApiError {
    metrics::counter!("garmin_fetch_failures_total", "endpoint" => endpoint).increment(1);
    warn!(endpoint, error = %err, "upstream fetch failed");
    ApiError::Upstream(err)
}

#[debug_handler]
pub async fn health_snapshot(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthSnapshot>> {
    let session = state.sessions.get_session().await?;
    let date = today_local();
    let stats = session
        .daily_stats(&date)
        .await
        .map_err(|e| fetch_failed("health", e))?;
    debug!(%date, "fetched daily stats");
    Ok(Json(to_health_snapshot(&stats)))
}

#[debug_handler]
pub async fn runs(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<RunSummary>>> {
    let session = state.sessions.get_session().await?;
    let activities = session
        .recent_activities(RUNS_OFFSET, RUNS_LIMIT)
        .await
        .map_err(|e| fetch_failed("runs", e))?;
    let runs = to_run_summaries(&activities);
    debug!(activities = activities.len(), runs = runs.len(), "fetched activities");
    Ok(Json(runs))
}

#[debug_handler]
pub async fn readiness(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "ok",
        "session": state.sessions.has_session(),
    });
    (StatusCode::OK, Json(body))
}

#[debug_handler]
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}
