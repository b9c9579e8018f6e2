//! Lazily created, process-wide upstream session.

use std::sync::Arc;

use garmin_connect_client::{Credentials, GarminConnector, GarminSession};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Login could not be established. Never cached; the next call retries.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Failed to connect")]
pub struct ConnectionFailure;

/// Owns the single upstream session.
///
/// The slot stays locked for the whole check-and-create sequence, so requests
/// racing before the first login wait for it instead of logging in again, and
/// every caller observes the same session instance.
pub struct SessionManager {
    connector: Arc<dyn GarminConnector>,
    credentials: Credentials,
    slot: Mutex<Option<Arc<dyn GarminSession>>>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn GarminConnector>, credentials: Credentials) -> Self {
        Self {
            connector,
            credentials,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached session, logging in first if there is none yet.
    ///
    /// A cached session is trusted for the lifetime of the process.
    pub async fn get_session(&self) -> Result<Arc<dyn GarminSession>, ConnectionFailure> {
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        metrics::counter!("garmin_login_attempts_total").increment(1);
        match self.connector.authenticate(&self.credentials).await {
            Ok(session) => {
                info!(account = %self.credentials.email, "logged in to Garmin Connect");
                *slot = Some(session.clone());
                Ok(session)
            }
            Err(e) => {
                metrics::counter!("garmin_login_failures_total").increment(1);
                error!(error = %e, "Garmin Connect login failed");
                Err(ConnectionFailure)
            }
        }
    }

    /// Whether a session is cached. Reports `false` while another caller holds
    /// the slot, e.g. during a login.
    pub fn has_session(&self) -> bool {
        self.slot
            .try_lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}
