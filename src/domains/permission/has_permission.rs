use serde::{Deserialize, Serialize};

// --- User Role Definition ---

/// Role stored on a user profile. Controls which screens and pharmacies the user may act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Operational,
    Validator,
    Network,
}

// --- Permission Enum Definition ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // Administration
    ManageUsers,
    ManagePharmacies,
    ManageIndicators,
    ManageRelations,
    ManageActionPlans,

    // Evidence workflow
    ReviewEvidence,
    SubmitEvidence,

    // Read access
    ViewCatalog,
    ViewPharmacies,
    ViewEvidence,
    ViewDashboard,
}

// --- UserRole Implementation ---

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Operational => "operational",
            UserRole::Validator => "validator",
            UserRole::Network => "network",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "operational" => Some(UserRole::Operational),
            "validator" => Some(UserRole::Validator),
            "network" => Some(UserRole::Network),
            _ => None,
        }
    }

    /// Display label used in user tables.
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::Operational => "Operacional",
            UserRole::Validator => "Validador",
            UserRole::Network => "Rede",
        }
    }

    pub fn all() -> [UserRole; 4] {
        [
            UserRole::Admin,
            UserRole::Operational,
            UserRole::Validator,
            UserRole::Network,
        ]
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Validator => match permission {
                Permission::ReviewEvidence => true,
                p if p.is_read_only() => true,
                _ => false,
            },
            UserRole::Operational => match permission {
                Permission::SubmitEvidence => true,
                p if p.is_read_only() => true,
                _ => false,
            },
            UserRole::Network => permission.is_read_only(),
        }
    }

    /// Check if the user has all of the specified permissions
    pub fn has_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    /// Only operational users are limited to the pharmacies listed on their profile.
    pub fn is_pharmacy_scoped(&self) -> bool {
        matches!(self, UserRole::Operational)
    }
}

// --- Permission Implementation ---

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ManagePharmacies => "manage_pharmacies",
            Permission::ManageIndicators => "manage_indicators",
            Permission::ManageRelations => "manage_relations",
            Permission::ManageActionPlans => "manage_action_plans",
            Permission::ReviewEvidence => "review_evidence",
            Permission::SubmitEvidence => "submit_evidence",
            Permission::ViewCatalog => "view_catalog",
            Permission::ViewPharmacies => "view_pharmacies",
            Permission::ViewEvidence => "view_evidence",
            Permission::ViewDashboard => "view_dashboard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|p| p.as_str() == s)
    }

    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Permission::ViewCatalog
                | Permission::ViewPharmacies
                | Permission::ViewEvidence
                | Permission::ViewDashboard
        )
    }

    pub fn all() -> Vec<Permission> {
        vec![
            Permission::ManageUsers,
            Permission::ManagePharmacies,
            Permission::ManageIndicators,
            Permission::ManageRelations,
            Permission::ManageActionPlans,
            Permission::ReviewEvidence,
            Permission::SubmitEvidence,
            Permission::ViewCatalog,
            Permission::ViewPharmacies,
            Permission::ViewEvidence,
            Permission::ViewDashboard,
        ]
    }
}
