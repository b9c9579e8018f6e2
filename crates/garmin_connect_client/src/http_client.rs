//! HTTP implementation of the Garmin Connect capability.
//!
//! [`ReqwestGarminConnector`] performs the login handshake and hands out
//! [`ReqwestGarminSession`]s that carry the bearer token and the account's
//! display name.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::utils::normalize_calendar_date;
use crate::{Activity, Credentials, DailyStats, GarminConnector, GarminError, GarminSession};

/// Logs in against the SSO token endpoint and resolves the account profile.
#[derive(Clone, Debug)]
pub struct ReqwestGarminConnector {
    base_url: String,
    sso_url: String,
    client: reqwest::Client,
}

impl ReqwestGarminConnector {
    /// Create a connector with the default request timeout.
    ///
    /// # Arguments
    /// * `base_url` - Connect API root (e.g. "https://connectapi.garmin.com")
    /// * `sso_url` - root of the OAuth token endpoint
    pub fn new(base_url: &str, sso_url: &str) -> Result<Self, GarminError> {
        Self::with_timeout(base_url, sso_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        sso_url: &str,
        timeout: Duration,
    ) -> Result<Self, GarminError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            sso_url: sso_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GarminError> {
        Self::with_timeout(&config.base_url, &config.sso_url, config.timeout)
    }
}

#[derive(serde::Deserialize)]
struct TokenPayload {
    access_token: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfilePayload {
    display_name: Option<String>,
}

#[async_trait]
impl GarminConnector for ReqwestGarminConnector {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn GarminSession>, GarminError> {
        let token_url = format!("{}/oauth/token", self.sso_url);
        let form = [
            ("grant_type", "password"),
            ("username", credentials.email.as_str()),
            ("password", credentials.password.expose_secret()),
        ];
        let resp = self.client.post(&token_url).form(&form).send().await?;
        let token: TokenPayload = decode_response(resp).await?;
        let access_token = SecretString::new(token.access_token.into());

        let profile_url = format!("{}/userprofile-service/socialProfile", self.base_url);
        let resp = self
            .client
            .get(&profile_url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;
        let profile: ProfilePayload = decode_response(resp).await?;
        let display_name = profile
            .display_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| GarminError::Auth("profile has no displayName".into()))?;
        tracing::debug!(%display_name, "garmin: resolved account profile");

        let session: Arc<dyn GarminSession> = Arc::new(ReqwestGarminSession {
            base_url: self.base_url.clone(),
            display_name,
            access_token,
            client: self.client.clone(),
        });
        Ok(session)
    }
}

/// Authenticated session bound to one account.
#[derive(Clone, Debug)]
pub struct ReqwestGarminSession {
    base_url: String,
    display_name: String,
    access_token: SecretString,
    client: reqwest::Client,
}

impl ReqwestGarminSession {
    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
    }
}

#[async_trait]
impl GarminSession for ReqwestGarminSession {
    async fn daily_stats(&self, date: &str) -> Result<DailyStats, GarminError> {
        let date = normalize_calendar_date(date)
            .ok_or_else(|| GarminError::InvalidInput(format!("invalid calendar date: {date}")))?;
        let url = format!(
            "{}/usersummary-service/usersummary/daily/{}",
            self.base_url, self.display_name
        );
        let resp = self
            .get_request(&url)
            .query(&[("calendarDate", date.as_str())])
            .send()
            .await?;
        // A day with no synced data comes back as a JSON `null`.
        let stats: Option<DailyStats> = decode_response(resp).await?;
        Ok(stats.unwrap_or_default())
    }

    async fn recent_activities(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Activity>, GarminError> {
        let url = format!(
            "{}/activitylist-service/activities/search/activities",
            self.base_url
        );
        let qp = [("start", offset.to_string()), ("limit", limit.to_string())];
        let resp = self.get_request(&url).query(&qp).send().await?;
        let activities: Option<Vec<Activity>> = decode_response(resp).await?;
        Ok(activities.unwrap_or_default())
    }
}

/// Check the status, then decode the body as JSON.
async fn decode_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, GarminError> {
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    // Read as text first so decode errors can carry a body snippet.
    let text = resp.text().await?;
    serde_json::from_str::<T>(&text).map_err(|e| {
        let body_snippet: String = text.chars().take(512).collect();
        GarminError::Decode(format!("{e} - body: {body_snippet}"))
    })
}

/// Extract error information from a failed response.
async fn error_from_response(resp: reqwest::Response) -> GarminError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body_snippet: String = body.chars().take(256).collect();
    GarminError::from_status(status, body_snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slashes() {
        let c = ReqwestGarminConnector::new("http://localhost/", "http://sso.local//")
            .expect("connector");
        assert_eq!(c.base_url, "http://localhost");
        assert_eq!(c.sso_url, "http://sso.local");
    }

    #[test]
    fn from_config_uses_configured_urls() {
        let cfg = Config::from_env_with(|k| match k {
            "GARMIN_EMAIL" => Some("a@b.c".into()),
            "GARMIN_PASSWORD" => Some("pw".into()),
            "GARMIN_BASE_URL" => Some("http://api.local".into()),
            "GARMIN_SSO_URL" => Some("http://sso.local".into()),
            _ => None,
        })
        .expect("cfg");
        let c = ReqwestGarminConnector::from_config(&cfg).expect("connector");
        assert_eq!(c.base_url, "http://api.local");
        assert_eq!(c.sso_url, "http://sso.local");
    }
}
