use crate::GarminError;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://connectapi.garmin.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Account credentials used for the login handshake.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: String,
    pub sso_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, GarminError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Read configuration through `get` instead of the process environment,
    /// so tests never have to mutate global state.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, GarminError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let email = get("GARMIN_EMAIL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| GarminError::Config("GARMIN_EMAIL missing".into()))?;
        let password = get("GARMIN_PASSWORD")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GarminError::Config("GARMIN_PASSWORD missing".into()))?;
        let base_url = get("GARMIN_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let sso_url = get("GARMIN_SSO_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout_secs = match get("GARMIN_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                GarminError::Config(format!("GARMIN_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            credentials: Credentials::new(email, SecretString::new(password.into())),
            base_url,
            sso_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
