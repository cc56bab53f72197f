use crate::auth::identity::IdentitySession;
use crate::auth::service::{AuthService, Credentials, CurrentUser};
use crate::auth::AuthContext;
use crate::errors::{ServiceError, ServiceResult};
use chrono::Utc;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// What the views know about the session at a given moment.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The first identity observation has not resolved yet.
    Loading,
    SignedOut,
    SignedIn(CurrentUser),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Session context built once at start-up and handed to every view.
pub struct SessionContext {
    auth: Arc<AuthService>,
    state: watch::Sender<SessionState>,
    identity: RwLock<Option<IdentitySession>>,
}

impl SessionContext {
    pub fn new(auth: Arc<AuthService>) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            auth,
            state,
            identity: RwLock::new(None),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.borrow().user().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Receiver that sees every later state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Applies an identity change reported by the provider (restored session,
    /// token refresh, sign-out elsewhere). A failed profile lookup leaves the
    /// user signed out.
    pub async fn observe(&self, session: Option<IdentitySession>) {
        let next = match &session {
            Some(identity) => match self.auth.resolve_profile(identity).await {
                Ok(user) => SessionState::SignedIn(user),
                Err(e) => {
                    error!("Could not restore session for {}: {}", identity.uid, e);
                    SessionState::SignedOut
                }
            },
            None => SessionState::SignedOut,
        };

        let signed_in = matches!(next, SessionState::SignedIn(_));
        *self.identity.write().await = if signed_in { session } else { None };
        self.state.send_replace(next);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<CurrentUser> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.auth.sign_in(&credentials).await {
            Ok((session, user)) => {
                *self.identity.write().await = Some(session);
                self.state.send_replace(SessionState::SignedIn(user.clone()));
                Ok(user)
            }
            Err(e) => {
                // a failed attempt still resolves the initial loading state
                if self.is_loading() {
                    self.state.send_replace(SessionState::SignedOut);
                }
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self) -> ServiceResult<()> {
        let session = self.identity.write().await.take();
        let result = match &session {
            Some(session) => self.auth.sign_out(session).await,
            None => Ok(()),
        };
        // the local session is gone either way
        self.state.send_replace(SessionState::SignedOut);
        match &result {
            Ok(()) => info!("Session cleared"),
            Err(e) => error!("Provider sign-out failed, local session cleared: {}", e),
        }
        result
    }

    /// Context for a service call. Fails when nobody is signed in or the
    /// identity token has expired.
    pub fn auth_context(&self) -> ServiceResult<AuthContext> {
        match self.current_user() {
            Some(user) if user.is_expired(Utc::now()) => Err(ServiceError::SessionExpired),
            Some(user) => Ok(user.auth_context()),
            None => Err(ServiceError::Authentication("Not signed in".to_string())),
        }
    }
}
