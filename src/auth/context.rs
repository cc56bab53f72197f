use crate::errors::ServiceError;
use crate::types::{Permission, UserRole};

/// Represents the authenticated user on whose behalf an operation runs
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    /// Identity-provider account id
    pub uid: String,

    /// Id of the `users` profile document, if one exists
    pub profile_id: Option<String>,

    pub name: String,

    pub role: UserRole,

    /// Pharmacies an operational user may act on
    pub pharmacies: Vec<String>,
}

impl AuthContext {
    pub fn new(uid: &str, profile_id: Option<String>, name: &str, role: UserRole, pharmacies: Vec<String>) -> Self {
        Self {
            uid: uid.to_string(),
            profile_id,
            name: name.to_string(),
            role,
            pharmacies,
        }
    }

    /// Context for maintenance tasks run outside a user session
    pub fn internal_system_context() -> Self {
        Self {
            uid: "system".to_string(),
            profile_id: None,
            name: "Sistema".to_string(),
            role: UserRole::Admin,
            pharmacies: Vec::new(),
        }
    }

    /// Id recorded as the actor on documents this user writes
    pub fn actor_id(&self) -> &str {
        self.profile_id.as_deref().unwrap_or(&self.uid)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Authorize a specific permission, returning an error if not allowed
    pub fn authorize(&self, permission: Permission) -> Result<(), ServiceError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "User does not have permission: {}",
                permission.as_str()
            )))
        }
    }

    /// Verify user is an admin
    pub fn authorize_admin(&self) -> Result<(), ServiceError> {
        if matches!(self.role, UserRole::Admin) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "This action requires administrator privileges".to_string(),
            ))
        }
    }

    /// Operational users may only act on their listed pharmacies; other roles on all.
    pub fn can_act_on_pharmacy(&self, pharmacy_id: &str) -> bool {
        !self.role.is_pharmacy_scoped() || self.pharmacies.iter().any(|p| p == pharmacy_id)
    }

    pub fn authorize_pharmacy(&self, pharmacy_id: &str) -> Result<(), ServiceError> {
        if self.can_act_on_pharmacy(pharmacy_id) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "You are not assigned to this pharmacy".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pharmacy_scope() {
        let operational = AuthContext::new("u1", None, "Ana", UserRole::Operational, vec!["p1".to_string()]);
        assert!(operational.can_act_on_pharmacy("p1"));
        assert!(!operational.can_act_on_pharmacy("p2"));
        assert!(operational.authorize_pharmacy("p2").is_err());

        let network = AuthContext::new("u2", None, "Bia", UserRole::Network, vec![]);
        assert!(network.can_act_on_pharmacy("p2"));
    }

    #[test]
    fn test_authorize() {
        let validator = AuthContext::new("u3", Some("doc-3".to_string()), "Caio", UserRole::Validator, vec![]);
        assert!(validator.authorize(Permission::ReviewEvidence).is_ok());
        assert!(matches!(
            validator.authorize(Permission::ManageUsers),
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(validator.authorize_admin().is_err());
        assert_eq!(validator.actor_id(), "doc-3");
        assert!(AuthContext::internal_system_context().authorize_admin().is_ok());
    }
}
