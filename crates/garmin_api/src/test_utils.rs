//! Mock connector and session used by unit tests.
#![cfg(test)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

use garmin_connect_client::{
    Activity, Credentials, DailyStats, GarminConnector, GarminError, GarminSession,
};
use secrecy::SecretString;

pub fn test_credentials() -> Credentials {
    Credentials::new("runner@example.com", SecretString::new("pw".into()))
}

/// Counts login attempts; fails the first `fail_first` of them.
pub struct CountingConnector {
    pub logins: AtomicU32,
    pub last_email: Mutex<Option<String>>,
    fail_first: u32,
    session: Arc<StubSession>,
}

impl CountingConnector {
    pub fn succeeding() -> Self {
        Self::with_session(0, StubSession::default())
    }

    pub fn failing_first(n: u32) -> Self {
        Self::with_session(n, StubSession::default())
    }

    pub fn with_session(fail_first: u32, session: StubSession) -> Self {
        Self::with_shared_session(fail_first, Arc::new(session))
    }

    /// Keep a handle on the session to inspect what it was asked for.
    pub fn with_shared_session(fail_first: u32, session: Arc<StubSession>) -> Self {
        Self {
            logins: AtomicU32::new(0),
            last_email: Mutex::new(None),
            fail_first,
            session,
        }
    }
}

#[async_trait]
impl GarminConnector for CountingConnector {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn GarminSession>, GarminError> {
        let attempt = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_email.lock().await = Some(credentials.email.clone());
        // Yield so concurrent callers get a chance to race the login.
        tokio::task::yield_now().await;
        if attempt <= self.fail_first {
            return Err(GarminError::Auth("bad credentials".into()));
        }
        let session: Arc<dyn GarminSession> = self.session.clone();
        Ok(session)
    }
}

/// Session returning canned data, or an upstream error when `fail` is set.
#[derive(Default)]
pub struct StubSession {
    pub stats: DailyStats,
    pub activities: Vec<Activity>,
    pub fail: bool,
    pub requested_dates: Mutex<Vec<String>>,
    pub requested_windows: Mutex<Vec<(u32, u32)>>,
}

#[async_trait]
impl GarminSession for StubSession {
    async fn daily_stats(&self, date: &str) -> Result<DailyStats, GarminError> {
        self.requested_dates.lock().await.push(date.to_string());
        if self.fail {
            return Err(GarminError::Status {
                status: 500,
                body: "upstream exploded".into(),
            });
        }
        Ok(self.stats.clone())
    }

    async fn recent_activities(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Activity>, GarminError> {
        self.requested_windows.lock().await.push((offset, limit));
        if self.fail {
            return Err(GarminError::Status {
                status: 500,
                body: "upstream exploded".into(),
            });
        }
        Ok(self.activities.clone())
    }
}
