//! Garmin Connect capability boundary: raw record types, the connector/session
//! traits and a reqwest-based implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod utils;

pub use config::{Config, Credentials};

#[derive(Debug, Error)]
pub enum GarminError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl GarminError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => GarminError::Auth(body),
            404 => GarminError::NotFound(body),
            429 => GarminError::RateLimited(body),
            _ => GarminError::Status { status, body },
        }
    }
}

/// Daily summary as returned by the upstream user-summary endpoint.
///
/// Every field may be missing or `null`; unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyStats {
    pub total_steps: Option<f64>,
    pub total_kilocalories: Option<f64>,
    pub total_distance_meters: Option<f64>,
    pub sleep_score: Option<f64>,
    pub body_battery_charged_value: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityType {
    pub type_key: Option<String>,
}

/// One entry of the upstream activity list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    pub activity_id: Option<Value>,
    pub activity_name: Option<Value>,
    pub activity_type: Option<ActivityType>,
    pub start_time_local: Option<String>,
    /// Meters.
    pub distance: Option<f64>,
    /// Seconds.
    pub duration: Option<f64>,
    pub calories: Option<Number>,
    #[serde(rename = "averageHR")]
    pub average_hr: Option<Number>,
}

impl Activity {
    /// `activityType.typeKey`, or `None` when either level is missing or null.
    pub fn type_key(&self) -> Option<&str> {
        self.activity_type
            .as_ref()
            .and_then(|t| t.type_key.as_deref())
    }
}

/// Produces authenticated sessions from account credentials.
#[async_trait]
pub trait GarminConnector: Send + Sync + 'static {
    /// Perform the login handshake. Any failure (bad credentials, network,
    /// upstream error) is returned as-is; callers decide whether to retry.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn GarminSession>, GarminError>;
}

/// An authenticated handle to one upstream account.
#[async_trait]
pub trait GarminSession: Send + Sync + 'static {
    /// Daily summary for a calendar date (`YYYY-MM-DD`).
    async fn daily_stats(&self, date: &str) -> Result<DailyStats, GarminError>;

    /// Most-recent-first activity list window.
    async fn recent_activities(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Activity>, GarminError>;
}
