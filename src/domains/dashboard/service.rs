use crate::auth::AuthContext;
use crate::domains::action_plan::service::ActionPlanService;
use crate::domains::dashboard::types::DashboardSummary;
use crate::domains::evidence::service::EvidenceService;
use crate::domains::pharmacy::service::PharmacyService;
use crate::errors::ServiceResult;
use crate::types::Permission;
use log::debug;
use std::sync::Arc;

pub struct DashboardService {
    plans: Arc<ActionPlanService>,
    evidences: Arc<EvidenceService>,
    pharmacies: Arc<PharmacyService>,
}

impl DashboardService {
    pub fn new(
        plans: Arc<ActionPlanService>,
        evidences: Arc<EvidenceService>,
        pharmacies: Arc<PharmacyService>,
    ) -> Self {
        Self {
            plans,
            evidences,
            pharmacies,
        }
    }

    /// Loads the three panels concurrently; any failure fails the whole summary.
    pub async fn summary(&self, auth: &AuthContext) -> ServiceResult<DashboardSummary> {
        auth.authorize(Permission::ViewDashboard)?;

        let (pending_plans, pending_evidence_count, pharmacies) = futures::try_join!(
            self.plans.open_plans(auth),
            self.evidences.pending_count(auth),
            self.pharmacies.pharmacy_options(auth)
        )?;
        debug!(
            "Dashboard: {} open plans, {} pending evidences",
            pending_plans.len(),
            pending_evidence_count
        );

        Ok(DashboardSummary {
            pending_plans,
            pending_evidence_count,
            pharmacies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::action_plan::repository::StoreActionPlanRepository;
    use crate::domains::action_plan::types::{ActionPlanDocument, ActionPlanStatus};
    use crate::domains::action_plan::ActionPlanRepository;
    use crate::domains::core::memory_store::{MemoryDocumentStore, StoreOperation};
    use crate::domains::core::object_storage::LocalObjectStorage;
    use crate::domains::evidence::repository::StoreEvidenceRepository;
    use crate::domains::indicator::repository::StoreIndicatorRepository;
    use crate::domains::pharmacy::repository::StorePharmacyRepository;
    use crate::types::{FlowCategory, Priority, UserRole};

    fn plan(title: &str, priority: Priority, status: ActionPlanStatus) -> ActionPlanDocument {
        ActionPlanDocument {
            title: title.to_string(),
            description: String::new(),
            rich_description: String::new(),
            indicator_id: "i1".to_string(),
            flow_type: FlowCategory::Revenue,
            priority,
            deadline: "7 dias".to_string(),
            steps: vec![],
            products: vec![],
            requires_photo: true,
            status: Some(status),
            created_at: None,
        }
    }

    fn setup(store: Arc<MemoryDocumentStore>, dir: &std::path::Path) -> (Arc<StoreActionPlanRepository>, DashboardService) {
        let plan_repo = Arc::new(StoreActionPlanRepository::new(store.clone()));
        let pharmacy_repo = Arc::new(StorePharmacyRepository::new(store.clone()));
        let plans = Arc::new(ActionPlanService::new(
            plan_repo.clone(),
            Arc::new(StoreIndicatorRepository::new(store.clone())),
        ));
        let evidences = Arc::new(EvidenceService::new(
            Arc::new(StoreEvidenceRepository::new(store.clone())),
            plan_repo.clone(),
            pharmacy_repo.clone(),
        ));
        let pharmacies = Arc::new(PharmacyService::new(
            pharmacy_repo,
            Arc::new(LocalObjectStorage::new(dir).unwrap()),
        ));
        (plan_repo, DashboardService::new(plans, evidences, pharmacies))
    }

    #[tokio::test]
    async fn test_summary_ranks_and_limits_open_plans() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let (plans, dashboard) = setup(store, dir.path());

        for i in 0..4 {
            plans
                .create(&plan(&format!("low {}", i), Priority::Low, ActionPlanStatus::Pending))
                .await
                .unwrap();
        }
        plans.create(&plan("medium", Priority::Medium, ActionPlanStatus::InProgress)).await.unwrap();
        plans.create(&plan("high", Priority::High, ActionPlanStatus::Pending)).await.unwrap();
        plans.create(&plan("closed", Priority::High, ActionPlanStatus::Validated)).await.unwrap();

        let network = AuthContext::new("n", None, "Rede", UserRole::Network, vec![]);
        let summary = dashboard.summary(&network).await.unwrap();
        let titles: Vec<&str> = summary.pending_plans.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "medium", "low 0", "low 1", "low 2"]);
        assert_eq!(summary.pending_evidence_count, 0);
        assert!(summary.pharmacies.is_empty());
    }

    #[tokio::test]
    async fn test_summary_fails_when_a_panel_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        store.fail_on(StoreOperation::Count, "evidences").await;
        let (_, dashboard) = setup(store, dir.path());

        let admin = AuthContext::new("admin", None, "Admin", UserRole::Admin, vec![]);
        let err = dashboard.summary(&admin).await.unwrap_err();
        assert_eq!(err.user_message("load the dashboard"), "Could not load the dashboard. Please try again.");
    }
}
