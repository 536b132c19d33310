use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::{is_usable_token, ApiClient};

use super::{SessionError, StorageError, TokenStorage};

/// Identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Read-only view of the session handed to consumers.
///
/// Only `SessionStore` builds these, so `is_authenticated` always agrees
/// with the presence of `token`, and `user` is never set on an anonymous
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    is_authenticated: bool,
    user: Option<AuthUser>,
    token: Option<String>,
    ready: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    fn anonymous(ready: bool) -> Self {
        Self {
            ready,
            ..Self::default()
        }
    }

    fn authenticated(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            is_authenticated: true,
            user: None,
            token: Some(token),
            ready: true,
            expires_at,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// False until the persisted token has been read at startup.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Server-reported expiry for sessions established by `login` in this
    /// process. Restored sessions carry none. Not enforced.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

/// Owner of the client's authentication state.
///
/// All mutation goes through `restore`, `login` and `logout`; each keeps
/// durable storage, the API client's credential and the published snapshot
/// in step.
pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<SessionSnapshot>,
    transition: Mutex<()>,
}

impl SessionStore {
    /// Create an anonymous store whose persisted token has not been read yet
    pub fn new(api: ApiClient, storage: Arc<dyn TokenStorage>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::anonymous(false));
        Self {
            api,
            storage,
            state,
            transition: Mutex::new(()),
        }
    }

    /// Create a store and restore any persisted session
    pub async fn initialize(api: ApiClient, storage: Arc<dyn TokenStorage>) -> Self {
        let store = Self::new(api, storage);
        store.restore().await;
        store
    }

    /// Shared API client carrying this session's credential
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    fn publish(&self, snapshot: SessionSnapshot) -> SessionSnapshot {
        self.state.send_replace(snapshot.clone());
        snapshot
    }

    /// Read the persisted token and adopt it without asking the server.
    ///
    /// Storage failures and unusable tokens leave the session anonymous.
    /// Only the first call does anything; later calls and calls made after
    /// a login return the current snapshot.
    pub async fn restore(&self) -> SessionSnapshot {
        let _guard = self.transition.lock().await;
        if self.state.borrow().is_ready() {
            return self.snapshot();
        }

        match self.storage.load() {
            Ok(Some(token)) if is_usable_token(&token) => {
                self.api.set_credential(&token);
                info!("Restored persisted session");
                self.publish(SessionSnapshot::authenticated(token, None))
            }
            Ok(Some(_)) => {
                warn!("Persisted token is unusable, discarding it");
                self.discard_persisted();
                self.api.clear_credential();
                self.publish(SessionSnapshot::anonymous(true))
            }
            Ok(None) => {
                debug!("No persisted session");
                self.publish(SessionSnapshot::anonymous(true))
            }
            Err(StorageError::Corrupt(e)) => {
                warn!(error = %e, "Persisted session is corrupt, discarding it");
                self.discard_persisted();
                self.publish(SessionSnapshot::anonymous(true))
            }
            Err(e) => {
                warn!(error = %e, "Session storage unavailable, starting anonymous");
                self.publish(SessionSnapshot::anonymous(true))
            }
        }
    }

    /// Authenticate against the API and establish a session.
    ///
    /// On failure nothing changes: the previous snapshot, the persisted
    /// token and the API credential are left as they were.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionSnapshot, SessionError> {
        let _guard = self.transition.lock().await;

        let response = self
            .api
            .login(email, password)
            .await
            .map_err(SessionError::Authentication)?;

        if let Err(e) = self.storage.save(&response.token) {
            warn!(error = %e, "Failed to persist session token, session will not survive a restart");
        }

        let expires_at = response
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));

        // The credential goes in before the snapshot is published so that
        // anything reacting to the transition already sends the token.
        self.api.set_credential(&response.token);
        info!("Logged in");
        Ok(self.publish(SessionSnapshot::authenticated(response.token, expires_at)))
    }

    /// End the session. Always succeeds; storage failures are only logged.
    pub async fn logout(&self) -> SessionSnapshot {
        let _guard = self.transition.lock().await;
        self.discard_persisted();
        self.api.logout();
        info!("Logged out");
        self.publish(SessionSnapshot::anonymous(true))
    }

    fn discard_persisted(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to clear persisted session token");
        }
    }
}
