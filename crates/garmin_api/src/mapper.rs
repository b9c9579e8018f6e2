//! Maps raw upstream records onto the public JSON contract.
//!
//! Absent and `null` upstream fields are normal, not errors. The policy for
//! each kind of field lives in [`or_zero`] and [`nonzero`].

use garmin_connect_client::{Activity, DailyStats};
use serde::Serialize;
use serde_json::{Number, Value};

/// Substring that marks an activity type as a run (`running`, `trail_running`,
/// `treadmill_running`, ...).
const RUN_TYPE_MARKER: &str = "run";

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HealthSnapshot {
    pub steps: i64,
    pub calories: i64,
    pub distance_km: f64,
    #[serde(rename = "sleepScore")]
    pub sleep_score: Option<i64>,
    #[serde(rename = "bodyBattery")]
    pub body_battery: Option<i64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RunSummary {
    pub id: Option<Value>,
    pub name: Option<Value>,
    /// `YYYY-MM-DD`, or empty when the upstream start time is missing.
    pub date: String,
    pub distance_km: f64,
    /// Whole minutes, serialized as a float.
    pub duration_min: f64,
    /// Minutes and seconds per kilometer, `M:SS`.
    pub pace: Option<String>,
    pub calories: Option<Number>,
    pub avg_hr: Option<Number>,
}

/// Missing or null counts as zero.
fn or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Missing, null or zero counts as "no value".
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Exact halves go to the even neighbour (0.125 -> 0.12, 2.5 -> 2).
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub fn to_health_snapshot(raw: &DailyStats) -> HealthSnapshot {
    HealthSnapshot {
        steps: or_zero(raw.total_steps).round() as i64,
        calories: or_zero(raw.total_kilocalories).round() as i64,
        distance_km: or_zero(raw.total_distance_meters) / 1000.0,
        sleep_score: nonzero(raw.sleep_score).map(|v| v.round() as i64),
        body_battery: nonzero(raw.body_battery_charged_value).map(|v| v.round() as i64),
    }
}

/// Keep iff the type key, lowercased, contains "run". No type key, no match.
pub fn is_run(activity: &Activity) -> bool {
    activity
        .type_key()
        .unwrap_or_default()
        .to_lowercase()
        .contains(RUN_TYPE_MARKER)
}

/// `None` unless the distance is positive.
pub fn pace(duration_sec: f64, distance_km: f64) -> Option<String> {
    if distance_km <= 0.0 {
        return None;
    }
    let sec_per_km = duration_sec / distance_km;
    let minutes = sec_per_km.div_euclid(60.0) as i64;
    let seconds = sec_per_km.rem_euclid(60.0).floor() as i64;
    Some(format!("{minutes}:{seconds:02}"))
}

pub fn to_run_summary(activity: &Activity) -> RunSummary {
    let distance_km = or_zero(activity.distance) / 1000.0;
    let duration_sec = or_zero(activity.duration);

    RunSummary {
        id: activity.activity_id.clone(),
        name: activity.activity_name.clone(),
        date: activity
            .start_time_local
            .as_deref()
            .map(|s| s.chars().take(10).collect())
            .unwrap_or_default(),
        distance_km: round_to(distance_km, 2),
        duration_min: round_to(duration_sec / 60.0, 0),
        pace: pace(duration_sec, distance_km),
        calories: activity.calories.clone(),
        avg_hr: activity.average_hr.clone(),
    }
}

/// Runs only, in upstream order.
pub fn to_run_summaries(raw: &[Activity]) -> Vec<RunSummary> {
    raw.iter().filter(|a| is_run(a)).map(to_run_summary).collect()
}
