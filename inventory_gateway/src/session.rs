//! Login session state shared by the screens.
//!
//! A [`SessionContext`] is created once per application and handed to whatever
//! needs to know who is logged in. It starts [`SessionState::Unknown`] until
//! [`SessionContext::init`] has asked the server.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;
use tracing::{info, warn};

use crate::{
    gateway::{AuthGateway, GatewayResult},
    models::User,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The server has not been asked yet.
    #[default]
    Unknown,
    Anonymous,
    Authenticated(User),
}

/// Explicit holder of the current user, cloned cheaply between screens.
#[derive(Clone)]
pub struct SessionContext {
    auth: Arc<dyn AuthGateway>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        Self {
            auth,
            state: Arc::new(RwLock::new(SessionState::Unknown)),
        }
    }

    fn set(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> Option<User> {
        match self.state() {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated(_))
    }

    /// Asks the server who is logged in. A failed check leaves the session
    /// anonymous and returns the error.
    pub async fn init(&self) -> GatewayResult<SessionState> {
        match self.auth.current_user().await {
            Ok(Some(user)) => {
                info!(username = %user.username, "restored session");
                self.set(SessionState::Authenticated(user));
            }
            Ok(None) => self.set(SessionState::Anonymous),
            Err(err) => {
                warn!(error = %err, "session check failed");
                self.set(SessionState::Anonymous);
                return Err(err);
            }
        }
        Ok(self.state())
    }

    pub async fn login(&self, username: &str, password: &SecretString) -> GatewayResult<User> {
        let user = self.auth.login(username, password).await?;
        info!(username = %user.username, "logged in");
        self.set(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Ends the session. Local state is cleared even when the server call fails.
    pub async fn logout(&self) -> GatewayResult<()> {
        let result = self.auth.logout().await;
        self.clear();
        info!("logged out");
        result
    }

    /// Forgets the user locally, e.g. after the server answered 401.
    pub fn clear(&self) {
        self.set(SessionState::Anonymous);
    }
}
