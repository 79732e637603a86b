//! The authentication gate: credentials in, session out.

use ballot_client::ElectionApi;
use ballot_types::{Credentials, Portal, RegistrationForm, User};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AuthError, SessionError};
use crate::storage::{SessionStorage, SESSION_TOKEN_KEY, SESSION_USER_KEY};

/// An authenticated user and the token the backend issued for them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: Option<String>,
}

/// Holds the current session and keeps persistent storage in step with it.
///
/// On the insurance portal the session is written to storage at login and
/// read back by [`AuthGate::restore`]; the election portal keeps it in
/// memory only. Logout always clears the storage keys.
pub struct AuthGate<S> {
    portal: Portal,
    storage: S,
    session: Option<Session>,
}

impl<S: SessionStorage> AuthGate<S> {
    pub fn new(portal: Portal, storage: S) -> Self {
        Self {
            portal,
            storage,
            session: None,
        }
    }

    pub fn portal(&self) -> Portal {
        self.portal
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load a persisted session, if this portal persists sessions.
    ///
    /// Unreadable or foreign-role entries are discarded rather than
    /// reported; the user simply has to log in again.
    pub fn restore(&mut self) -> Result<Option<&Session>, SessionError> {
        if !self.portal.persists_session() {
            return Ok(self.session.as_ref());
        }

        let raw = match self.storage.get(SESSION_USER_KEY) {
            Ok(raw) => raw,
            Err(SessionError::Corrupt(detail)) => {
                warn!(%detail, "discarding corrupt session storage");
                self.clear_storage()?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let Some(raw) = raw else {
            return Ok(None);
        };

        let user = match serde_json::from_str::<User>(&raw) {
            Ok(user) if self.portal.allows(user.role) => user,
            Ok(user) => {
                warn!(role = %user.role, "stored session role not valid for this portal");
                self.clear_storage()?;
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable stored session");
                self.clear_storage()?;
                return Ok(None);
            }
        };
        let token = self.storage.get(SESSION_TOKEN_KEY)?;

        info!(user = %user.id, role = %user.role, "session restored");
        self.session = Some(Session { user, token });
        Ok(self.session.as_ref())
    }

    /// Authenticate against the backend.
    ///
    /// Validation problems are reported as such; every backend or
    /// transport failure becomes [`AuthError::LoginRejected`]. A response
    /// whose role differs from the requested one, or is foreign to this
    /// portal, is rejected the same way and nothing is stored.
    pub async fn login<A: ElectionApi>(
        &mut self,
        api: &A,
        credentials: &Credentials,
    ) -> Result<&Session, AuthError> {
        let request = credentials.to_request(self.portal)?;

        let response = api.login(&request).await.map_err(|e| {
            warn!(error = %e, "login failed");
            AuthError::LoginRejected
        })?;

        if !self.portal.allows(response.role) {
            warn!(role = %response.role, "login returned a role foreign to this portal");
            return Err(AuthError::LoginRejected);
        }
        if request.role.is_some_and(|expected| expected != response.role) {
            warn!(role = %response.role, "login returned a different role than requested");
            return Err(AuthError::LoginRejected);
        }

        let session = Session {
            user: response.user(),
            token: response.token.clone(),
        };

        if self.portal.persists_session() {
            self.persist(&session)?;
        }

        info!(user = %session.user.id, role = %session.user.role, "logged in");
        Ok(self.session.insert(session))
    }

    /// Drop the session and its storage keys.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(session) = self.session.take() {
            info!(user = %session.user.id, "logged out");
        }
        self.clear_storage()
    }

    /// Self-service registration. Does not log the user in.
    pub async fn register<A: ElectionApi>(
        &self,
        api: &A,
        form: &RegistrationForm,
    ) -> Result<(), AuthError> {
        let request = form.to_request(self.portal)?;
        api.register(&request).await.map_err(|e| {
            warn!(error = %e, "registration failed");
            AuthError::RegistrationRejected
        })?;
        info!(email = %request.email, "registered");
        Ok(())
    }

    fn persist(&mut self, session: &Session) -> Result<(), SessionError> {
        let user = serde_json::to_string(&session.user)
            .map_err(|e| SessionError::Storage(format!("JSON serialization failed: {e}")))?;
        self.storage.set(SESSION_USER_KEY, &user)?;
        match &session.token {
            Some(token) => self.storage.set(SESSION_TOKEN_KEY, token),
            None => self.storage.remove(SESSION_TOKEN_KEY),
        }
    }

    fn clear_storage(&mut self) -> Result<(), SessionError> {
        self.storage.remove(SESSION_USER_KEY)?;
        self.storage.remove(SESSION_TOKEN_KEY)
    }
}
