use crate::auth::{AuthContext, IdentityProvider};
use crate::domains::core::search::filter_by_search;
use crate::domains::core::workflow::WorkflowReport;
use crate::domains::pharmacy::repository::PharmacyRepository;
use crate::domains::user::repository::UserRepository;
use crate::domains::user::types::{User, UserDocument, UserFilter, UserForm, UserListItem, UserPatch};
use crate::errors::{ServiceError, ServiceResult};
use crate::types::{Confirmation, Permission};
use crate::validation::{Email, Validate};
use chrono::Utc;
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::Arc;

/// Shown in place of a pharmacy id that no longer resolves.
pub const UNKNOWN_PHARMACY: &str = "Desconhecida";

/// User service: profile documents plus their identity-provider accounts.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    pharmacies: Arc<dyn PharmacyRepository>,
    identity: Arc<dyn IdentityProvider>,
    temporary_password: String,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        pharmacies: Arc<dyn PharmacyRepository>,
        identity: Arc<dyn IdentityProvider>,
        temporary_password: &str,
    ) -> Self {
        Self {
            users,
            pharmacies,
            identity,
            temporary_password: temporary_password.to_string(),
        }
    }

    /// Users matching the role/status filters and the search term, with their
    /// pharmacy ids resolved to names.
    pub async fn list_users(&self, auth: &AuthContext, filter: &UserFilter) -> ServiceResult<Vec<UserListItem>> {
        auth.authorize(Permission::ManageUsers)?;

        let users = self.users.find_all(filter).await?;
        let names: HashMap<String, String> = self
            .pharmacies
            .find_all()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        debug!("Loaded {} users, {} pharmacies", users.len(), names.len());

        let items = filter_by_search(users, &filter.search)
            .into_iter()
            .map(|user| {
                let pharmacy_names = user
                    .pharmacies
                    .iter()
                    .map(|id| {
                        names
                            .get(id)
                            .cloned()
                            .unwrap_or_else(|| UNKNOWN_PHARMACY.to_string())
                    })
                    .collect();
                UserListItem { user, pharmacy_names }
            })
            .collect();
        Ok(items)
    }

    pub async fn get_user(&self, auth: &AuthContext, id: &str) -> ServiceResult<User> {
        auth.authorize(Permission::ManageUsers)?;
        Ok(self.users.find_by_id(id).await?)
    }

    /// Provisions a user in three independent steps: identity account with the
    /// temporary password, profile document, password-reset email.
    ///
    /// Nothing is rolled back. A failed reset email leaves the account and the
    /// profile in place and is reported as `PartialFailure`.
    pub async fn create_user(&self, auth: &AuthContext, form: UserForm) -> ServiceResult<User> {
        auth.authorize(Permission::ManageUsers)?;
        form.validate()?;
        let email = Email::new(&form.email).map_err(crate::errors::DomainError::from)?;

        let mut workflow = WorkflowReport::start("create_user");

        let account = workflow.step(
            "create_account",
            self.identity
                .create_account(email.as_str(), &self.temporary_password)
                .await,
        )?;

        let document = UserDocument {
            uid: Some(account.uid.clone()),
            name: form.name.trim().to_string(),
            email: email.as_str().to_string(),
            role: form.role,
            status: form.status,
            pharmacies: form.normalized_pharmacies(),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        let user = workflow.step("write_profile", self.users.create(&document).await)?;

        workflow.step(
            "send_password_reset",
            self.identity.send_password_reset(email.as_str()).await,
        )?;

        workflow.finish();
        info!("User {} ({}) created by {}", user.email, user.id, auth.uid);
        Ok(user)
    }

    /// Edits name, role, status and pharmacies. The email stays as created.
    pub async fn update_user(&self, auth: &AuthContext, id: &str, form: UserForm) -> ServiceResult<User> {
        auth.authorize(Permission::ManageUsers)?;
        form.validate()?;

        let patch = UserPatch {
            name: form.name.trim().to_string(),
            role: form.role,
            status: form.status,
            pharmacies: form.normalized_pharmacies(),
            updated_at: Utc::now(),
        };
        let user = self.users.update(id, &patch).await.map_err(|e| {
            error!("Failed to update user {}: {}", id, e);
            ServiceError::from(e)
        })?;
        info!("User {} updated by {}", id, auth.uid);
        Ok(user)
    }

    /// Flips active/inactive and returns the new status.
    pub async fn toggle_status(&self, auth: &AuthContext, id: &str) -> ServiceResult<User> {
        auth.authorize(Permission::ManageUsers)?;
        let user = self.users.find_by_id(id).await?;
        let status = user.status.toggled();
        self.users.set_status(id, status).await?;
        info!("User {} set to {} by {}", id, status.as_str(), auth.uid);
        Ok(User { status, ..user })
    }

    pub async fn send_password_reset(&self, auth: &AuthContext, email: &str) -> ServiceResult<()> {
        auth.authorize(Permission::ManageUsers)?;
        let email = Email::new(email).map_err(crate::errors::DomainError::from)?;
        self.identity.send_password_reset(email.as_str()).await.map_err(|e| {
            error!("Password reset for {} failed: {}", email.as_str(), e);
            e
        })?;
        info!("Password reset sent to {} by {}", email.as_str(), auth.uid);
        Ok(())
    }

    /// Removes the profile document only; the identity account is kept.
    pub async fn delete_user(&self, auth: &AuthContext, id: &str, confirmation: Confirmation) -> ServiceResult<()> {
        auth.authorize(Permission::ManageUsers)?;
        confirmation.require("delete user")?;
        self.users.delete(id).await?;
        info!("User {} deleted by {}", id, auth.uid);
        Ok(())
    }
}
