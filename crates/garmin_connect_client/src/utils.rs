//! Date helpers shared by the client and the service.

/// Normalize a calendar date to `YYYY-MM-DD`.
///
/// Accepts:
/// - YYYY-MM-DD (returned as-is)
/// - RFC3339 datetime (date part in its own offset)
/// - Naive datetime YYYY-MM-DDTHH:MM:SS
pub fn normalize_calendar_date(s: &str) -> Option<String> {
    if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
        return Some(s.to_string());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.date().format("%Y-%m-%d").to_string());
    }
    None
}

/// Today's date in the host's local timezone.
pub fn today_local() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
