use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use garmin_api::{AppState, SessionManager};
use garmin_connect_client::{
    Activity, Credentials, DailyStats, GarminConnector, GarminError, GarminSession,
};

struct LocalSession {
    stats: Value,
    activities: Value,
    fail_fetch: bool,
}

#[async_trait::async_trait]
impl GarminSession for LocalSession {
    async fn daily_stats(&self, _date: &str) -> Result<DailyStats, GarminError> {
        if self.fail_fetch {
            return Err(GarminError::NotFound("no summary for user".into()));
        }
        serde_json::from_value(self.stats.clone()).map_err(|e| GarminError::Decode(e.to_string()))
    }

    async fn recent_activities(
        &self,
        _offset: u32,
        _limit: u32,
    ) -> Result<Vec<Activity>, GarminError> {
        if self.fail_fetch {
            return Err(GarminError::NotFound("no summary for user".into()));
        }
        serde_json::from_value(self.activities.clone())
            .map_err(|e| GarminError::Decode(e.to_string()))
    }
}

struct LocalConnector {
    logins: AtomicU32,
    fail_logins: u32,
    session: Arc<LocalSession>,
}

#[async_trait::async_trait]
impl GarminConnector for LocalConnector {
    async fn authenticate(
        &self,
        _credentials: &Credentials,
    ) -> Result<Arc<dyn GarminSession>, GarminError> {
        let attempt = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_logins {
            return Err(GarminError::Auth("invalid_grant".into()));
        }
        let session: Arc<dyn GarminSession> = self.session.clone();
        Ok(session)
    }
}

fn app_with(connector: Arc<LocalConnector>) -> axum::Router {
    let credentials = Credentials::new("runner@example.com", SecretString::new("pw".into()));
    let sessions = SessionManager::new(connector, credentials);
    let metrics = PrometheusBuilder::new().build_recorder().handle();
    garmin_api::router(Arc::new(AppState::new(sessions, metrics)))
}

fn connector(fail_logins: u32, fail_fetch: bool) -> Arc<LocalConnector> {
    Arc::new(LocalConnector {
        logins: AtomicU32::new(0),
        fail_logins,
        session: Arc::new(LocalSession {
            stats: json!({
                "totalSteps": 12345,
                "totalKilocalories": 2100,
                "totalDistanceMeters": 5000,
                "sleepScore": 77,
                "bodyBatteryChargedValue": null,
                "restingHeartRate": 48
            }),
            activities: json!([
                {
                    "activityId": 101,
                    "activityName": "Tempo Run",
                    "activityType": {"typeKey": "running"},
                    "startTimeLocal": "2024-05-01T07:00:00",
                    "distance": 5000.0,
                    "duration": 1500.0,
                    "calories": 380,
                    "averageHR": 162
                },
                {
                    "activityId": 100,
                    "activityName": "Commute",
                    "activityType": {"typeKey": "cycling"},
                    "distance": 12000.0,
                    "duration": 2400.0
                },
                {
                    "activityId": 99,
                    "activityName": "Strides",
                    "activityType": {"typeKey": "track_running"},
                    "distance": 0.0,
                    "duration": 300.0
                }
            ]),
            fail_fetch,
        }),
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_endpoint_returns_snapshot() {
    let app = app_with(connector(0, false));
    let (status, body) = get(app, "/api/garmin/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "steps": 12345,
            "calories": 2100,
            "distance_km": 5.0,
            "sleepScore": 77,
            "bodyBattery": null
        })
    );
}

#[tokio::test]
async fn runs_endpoint_filters_and_maps() {
    let app = app_with(connector(0, false));
    let (status, body) = get(app, "/api/garmin/runs").await;
    assert_eq!(status, StatusCode::OK);
    let runs = body.as_array().expect("array");
    assert_eq!(runs.len(), 2);
    assert_eq!(
        runs[0],
        json!({
            "id": 101,
            "name": "Tempo Run",
            "date": "2024-05-01",
            "distance_km": 5.0,
            "duration_min": 25.0,
            "pace": "5:00",
            "calories": 380,
            "avg_hr": 162
        })
    );
    assert_eq!(runs[1]["id"], 99);
    assert_eq!(runs[1]["date"], "");
    assert!(runs[1]["pace"].is_null());
}

#[tokio::test]
async fn login_failure_returns_fixed_error_and_is_retried() {
    let conn = connector(1, false);
    let app = app_with(conn.clone());

    let (status, body) = get(app.clone(), "/api/garmin/health").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to connect"}));

    let (status, _) = get(app, "/api/garmin/runs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conn.logins.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn fetch_failure_returns_underlying_message() {
    let app = app_with(connector(0, true));
    let (status, body) = get(app, "/api/garmin/runs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "not found: no summary for user"}));
}

#[tokio::test]
async fn session_is_shared_across_requests() {
    let conn = connector(0, false);
    let app = app_with(conn.clone());
    for uri in ["/api/garmin/health", "/api/garmin/runs", "/api/garmin/health"] {
        let (status, _) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(conn.logins.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn readiness_reports_session_state() {
    let app = app_with(connector(0, false));
    let (status, body) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "session": false}));

    get(app.clone(), "/api/garmin/health").await;
    let (_, body) = get(app, "/health").await;
    assert_eq!(body["session"], true);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app_with(connector(0, false));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/garmin/runs")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
