use std::net::SocketAddr;

pub const DEFAULT_ADDRESS: ([u8; 4], u16) = ([127, 0, 0, 1], 5001);
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Process-level settings for the HTTP server. Upstream credentials live in
/// [`garmin_connect_client::Config`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub log_filter: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// `GARMIN_API_LOG_LEVEL` wins over `RUST_LOG`. An unparsable `ADDRESS`
    /// falls back to the default.
    pub fn from_env_with<F>(mut get: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let log_filter = get("GARMIN_API_LOG_LEVEL")
            .or_else(|| get("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let addr = get("ADDRESS")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_ADDRESS));
        Self { addr, log_filter }
    }
}
