use crate::domains::core::document_store::{collections, EntityDocument};
use crate::domains::core::search::Searchable;
use crate::errors::{DomainResult, StoreResult, ValidationError};
use crate::types::{timestamp, RecordStatus, UserRole};
use crate::validation::{FormValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Core User entity - a console user profile stored in `users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Identity-provider account id, when the profile was provisioned by the console.
    pub uid: Option<String>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: RecordStatus,
    /// Pharmacy ids; only meaningful for the operational role.
    pub pharmacies: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

/// Stored shape of a `users` document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub pharmacies: Vec<String>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EntityDocument for UserDocument {
    type Entity = User;

    const COLLECTION: &'static str = collections::USERS;

    fn into_entity(self, id: String) -> StoreResult<User> {
        Ok(User {
            id,
            uid: self.uid,
            name: self.name,
            email: self.email,
            role: self.role,
            status: self.status,
            pharmacies: self.pharmacies,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Create/edit dialog payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: RecordStatus,
    pub pharmacies: Vec<String>,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: UserRole::Operational,
            status: RecordStatus::Active,
            pharmacies: Vec::new(),
        }
    }
}

impl UserForm {
    /// Pharmacy links are dropped for roles that are not pharmacy scoped.
    pub fn normalized_pharmacies(&self) -> Vec<String> {
        if self.role.is_pharmacy_scoped() {
            self.pharmacies.clone()
        } else {
            Vec::new()
        }
    }
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            pharmacies: user.pharmacies.clone(),
        }
    }
}

impl Validate for UserForm {
    fn validate(&self) -> DomainResult<()> {
        let mut form = FormValidator::new();

        form.check(ValidationBuilder::new("name", Some(self.name.clone())).required());
        form.check(
            ValidationBuilder::new("email", Some(self.email.clone()))
                .required()
                .email(),
        );

        if self.role.is_pharmacy_scoped() && self.pharmacies.is_empty() {
            form.add_error(ValidationError::invalid_value(
                "pharmacies",
                "select at least one pharmacy",
            ));
        }

        form.validate()
    }
}

/// Fields written when an existing profile is edited. Email is fixed after creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: String,
    pub role: UserRole,
    pub status: RecordStatus,
    pub pharmacies: Vec<String>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusPatch {
    pub status: RecordStatus,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// List filters of the users page
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<RecordStatus>,
    pub search: String,
}

/// One row of the users table, with pharmacy ids resolved to names.
#[derive(Debug, Clone, Serialize)]
pub struct UserListItem {
    pub user: User,
    pub pharmacy_names: Vec<String>,
}

impl UserListItem {
    /// Comma separated pharmacy names, "-" when the user has none.
    pub fn pharmacy_label(&self) -> String {
        if self.pharmacy_names.is_empty() {
            "-".to_string()
        } else {
            self.pharmacy_names.join(", ")
        }
    }
}
