use crate::auth::identity::{IdentityProvider, IdentitySession};
use crate::auth::AuthContext;
use crate::domains::user::repository::UserRepository;
use crate::errors::{DomainResult, ServiceError, ServiceResult};
use crate::types::{RecordStatus, UserRole};
use crate::validation::{FormValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Display name used when an account has no profile and no display name.
pub const DEFAULT_PROFILE_NAME: &str = "Usuário";

/// Credentials DTO - used for login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> DomainResult<()> {
        let mut form = FormValidator::new();
        form.check(
            ValidationBuilder::new("email", Some(self.email.clone()))
                .required()
                .email(),
        );
        form.check(ValidationBuilder::new("password", Some(self.password.clone())).required());
        form.validate()
    }
}

/// The signed-in user as the views see it: identity plus resolved profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser {
    pub uid: String,
    pub email: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub pharmacies: Vec<String>,
    /// `None` when no profile document exists and defaults were used.
    pub profile_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CurrentUser {
    pub fn auth_context(&self) -> AuthContext {
        AuthContext::new(
            &self.uid,
            self.profile_id.clone(),
            &self.name,
            self.role,
            self.pharmacies.clone(),
        )
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |exp| exp <= now)
    }
}

/// Auth service for signing users in and resolving their profiles
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserRepository>) -> Self {
        Self { identity, users }
    }

    /// Authenticates with the identity provider and loads the matching profile.
    /// Inactive profiles are signed back out and refused.
    pub async fn sign_in(&self, credentials: &Credentials) -> ServiceResult<(IdentitySession, CurrentUser)> {
        credentials.validate()?;

        let session = self
            .identity
            .sign_in(credentials.email.trim(), &credentials.password)
            .await?;

        match self.resolve_profile(&session).await {
            Ok(user) => {
                info!("User {} signed in as {}", user.uid, user.role.as_str());
                Ok((session, user))
            }
            Err(e) => {
                if let Err(sign_out_err) = self.identity.sign_out(&session).await {
                    warn!("Failed to sign out refused session {}: {}", session.uid, sign_out_err);
                }
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self, session: &IdentitySession) -> ServiceResult<()> {
        self.identity.sign_out(session).await?;
        info!("User {} signed out", session.uid);
        Ok(())
    }

    /// Profile for an identity session. Without a profile document the user
    /// gets the operational role and the account's display name.
    pub async fn resolve_profile(&self, session: &IdentitySession) -> ServiceResult<CurrentUser> {
        let profile = self.users.find_by_uid(&session.uid).await.map_err(|e| {
            error!("Failed to load profile for {}: {}", session.uid, e);
            ServiceError::from(e)
        })?;

        let user = match profile {
            Some(profile) => {
                if profile.status == RecordStatus::Inactive {
                    warn!("Refusing session for inactive user {}", session.uid);
                    return Err(ServiceError::Authentication("Account is inactive".to_string()));
                }
                CurrentUser {
                    uid: session.uid.clone(),
                    email: session.email.clone().or(Some(profile.email)),
                    name: profile.name,
                    role: profile.role,
                    pharmacies: profile.pharmacies,
                    profile_id: Some(profile.id),
                    expires_at: session.expires_at,
                }
            }
            None => CurrentUser {
                uid: session.uid.clone(),
                email: session.email.clone(),
                name: session
                    .display_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string()),
                role: UserRole::Operational,
                pharmacies: Vec::new(),
                profile_id: None,
                expires_at: session.expires_at,
            },
        };
        Ok(user)
    }
}
