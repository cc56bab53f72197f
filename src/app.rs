use crate::auth::{AuthService, IdentityProvider, RestIdentityProvider, SessionContext};
use crate::config::AdminConfig;
use crate::domains::action_plan::{ActionPlanService, StoreActionPlanRepository};
use crate::domains::core::document_store::DocumentStore;
use crate::domains::core::object_storage::{LocalObjectStorage, ObjectStorage};
use crate::domains::core::sqlite_store::SqliteDocumentStore;
use crate::domains::dashboard::DashboardService;
use crate::domains::evidence::{EvidenceService, StoreEvidenceRepository};
use crate::domains::indicator::{IndicatorService, StoreIndicatorRepository};
use crate::domains::pharmacy::{PharmacyService, StorePharmacyRepository};
use crate::domains::relation::{RelationService, StoreRelationRepository};
use crate::domains::user::{StoreUserRepository, UserService};
use crate::errors::{DomainError, ServiceError, ServiceResult};
use log::info;
use std::sync::Arc;

/// Every service of the console, wired once at start-up over shared backends.
pub struct AdminApp {
    pub session: Arc<SessionContext>,
    pub users: Arc<UserService>,
    pub pharmacies: Arc<PharmacyService>,
    pub indicators: Arc<IndicatorService>,
    pub relations: Arc<RelationService>,
    pub action_plans: Arc<ActionPlanService>,
    pub evidences: Arc<EvidenceService>,
    pub dashboard: Arc<DashboardService>,
}

impl AdminApp {
    /// Opens the SQLite document store, the local object storage and the REST
    /// identity client described by `config`.
    pub async fn initialize(config: &AdminConfig) -> ServiceResult<Self> {
        info!("Initializing FarmUP Admin with database {}", config.database_url);

        let store = SqliteDocumentStore::connect(&config.database_url)
            .await
            .map_err(DomainError::from)?;
        let storage = LocalObjectStorage::new(&config.storage_path).map_err(|e| {
            ServiceError::Configuration(format!(
                "Cannot open storage at {}: {}",
                config.storage_path.display(),
                e
            ))
        })?;
        let identity = RestIdentityProvider::new(&config.identity_base_url, &config.identity_api_key);

        Ok(Self::with_backends(
            Arc::new(store),
            Arc::new(storage),
            Arc::new(identity),
            &config.temporary_password,
        ))
    }

    pub fn with_backends(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        identity: Arc<dyn IdentityProvider>,
        temporary_password: &str,
    ) -> Self {
        let user_repo = Arc::new(StoreUserRepository::new(store.clone()));
        let pharmacy_repo = Arc::new(StorePharmacyRepository::new(store.clone()));
        let indicator_repo = Arc::new(StoreIndicatorRepository::new(store.clone()));
        let relation_repo = Arc::new(StoreRelationRepository::new(store.clone()));
        let plan_repo = Arc::new(StoreActionPlanRepository::new(store.clone()));
        let evidence_repo = Arc::new(StoreEvidenceRepository::new(store));

        let auth = Arc::new(AuthService::new(identity.clone(), user_repo.clone()));
        let session = Arc::new(SessionContext::new(auth));

        let users = Arc::new(UserService::new(
            user_repo,
            pharmacy_repo.clone(),
            identity,
            temporary_password,
        ));
        let pharmacies = Arc::new(PharmacyService::new(pharmacy_repo.clone(), storage));
        let indicators = Arc::new(IndicatorService::new(indicator_repo.clone(), relation_repo.clone()));
        let relations = Arc::new(RelationService::new(relation_repo, indicator_repo.clone()));
        let action_plans = Arc::new(ActionPlanService::new(plan_repo.clone(), indicator_repo));
        let evidences = Arc::new(EvidenceService::new(evidence_repo, plan_repo, pharmacy_repo));
        let dashboard = Arc::new(DashboardService::new(
            action_plans.clone(),
            evidences.clone(),
            pharmacies.clone(),
        ));

        Self {
            session,
            users,
            pharmacies,
            indicators,
            relations,
            action_plans,
            evidences,
            dashboard,
        }
    }
}
