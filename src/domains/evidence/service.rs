use crate::auth::AuthContext;
use crate::domains::action_plan::repository::ActionPlanRepository;
use crate::domains::core::search::filter_by_search;
use crate::domains::evidence::repository::EvidenceRepository;
use crate::domains::evidence::types::{
    Evidence, EvidenceDocument, EvidenceFilter, EvidenceStatus, EvidenceSubmission, ReviewDecision,
};
use crate::domains::pharmacy::repository::PharmacyRepository;
use crate::errors::{DomainError, ServiceResult};
use crate::types::Permission;
use crate::validation::Validate;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

pub struct EvidenceService {
    evidences: Arc<dyn EvidenceRepository>,
    plans: Arc<dyn ActionPlanRepository>,
    pharmacies: Arc<dyn PharmacyRepository>,
}

impl EvidenceService {
    pub fn new(
        evidences: Arc<dyn EvidenceRepository>,
        plans: Arc<dyn ActionPlanRepository>,
        pharmacies: Arc<dyn PharmacyRepository>,
    ) -> Self {
        Self {
            evidences,
            plans,
            pharmacies,
        }
    }

    /// Newest submissions first, narrowed by plan title, pharmacy or user name.
    /// Operational users only see evidence of their pharmacies.
    pub async fn list_evidences(&self, auth: &AuthContext, filter: &EvidenceFilter) -> ServiceResult<Vec<Evidence>> {
        auth.authorize(Permission::ViewEvidence)?;
        let evidences = self.evidences.find_filtered(filter).await?;
        debug!("Loaded {} evidences", evidences.len());
        let visible = evidences
            .into_iter()
            .filter(|e| auth.can_act_on_pharmacy(&e.pharmacy_id))
            .collect();
        Ok(filter_by_search(visible, &filter.search))
    }

    /// A missing id is `EntityNotFound`; the detail view returns to the previous route on it.
    pub async fn get_evidence(&self, auth: &AuthContext, id: &str) -> ServiceResult<Evidence> {
        auth.authorize(Permission::ViewEvidence)?;
        let evidence = self.evidences.find_by_id(id).await?;
        auth.authorize_pharmacy(&evidence.pharmacy_id)?;
        Ok(evidence)
    }

    /// Records a field submission as pending. Plan title and pharmacy name are
    /// copied onto the evidence for listing.
    pub async fn submit_evidence(&self, auth: &AuthContext, submission: EvidenceSubmission) -> ServiceResult<Evidence> {
        auth.authorize(Permission::SubmitEvidence)?;
        submission.validate()?;
        let pharmacy_id = submission.pharmacy_id.trim();
        auth.authorize_pharmacy(pharmacy_id)?;

        let (plan, pharmacy) = futures::try_join!(
            self.plans.find_by_id(submission.action_plan_id.trim()),
            self.pharmacies.find_by_id(pharmacy_id)
        )?;

        let document = EvidenceDocument {
            action_plan_id: plan.id,
            action_plan_title: plan.title,
            pharmacy_id: pharmacy.id,
            pharmacy_name: pharmacy.name,
            user_id: auth.actor_id().to_string(),
            user_name: auth.name.clone(),
            photo: submission.photo.trim().to_string(),
            status: EvidenceStatus::Pending,
            submitted_at: Some(Utc::now()),
            reviewed_at: None,
            location: submission.location,
            feedback: None,
        };
        let evidence = self.evidences.create(&document).await?;
        info!(
            "Evidence {} for plan {} submitted by {}",
            evidence.id, evidence.action_plan_id, auth.uid
        );
        Ok(evidence)
    }

    async fn review(&self, auth: &AuthContext, id: &str, decision: ReviewDecision) -> ServiceResult<Evidence> {
        auth.authorize(Permission::ReviewEvidence)?;
        let evidence = self.evidences.find_by_id(id).await?;

        let patch = evidence.review(decision, Utc::now()).map_err(|e: DomainError| {
            warn!("Review of evidence {} refused: {}", id, e);
            e
        })?;
        let reviewed = self.evidences.record_review(id, &patch).await?;
        info!(
            "Evidence {} {} by {}",
            id,
            reviewed.status.as_str(),
            auth.uid
        );
        Ok(reviewed)
    }

    /// Approves a pending evidence; feedback is optional.
    pub async fn approve(&self, auth: &AuthContext, id: &str, feedback: Option<String>) -> ServiceResult<Evidence> {
        self.review(auth, id, ReviewDecision::Approve { feedback }).await
    }

    /// Rejects a pending evidence. A blank reason is refused and nothing is written.
    pub async fn reject(&self, auth: &AuthContext, id: &str, reason: &str) -> ServiceResult<Evidence> {
        self.review(
            auth,
            id,
            ReviewDecision::Reject {
                reason: reason.to_string(),
            },
        )
        .await
    }

    pub async fn pending_count(&self, auth: &AuthContext) -> ServiceResult<usize> {
        auth.authorize(Permission::ViewDashboard)?;
        Ok(self.evidences.count_by_status(EvidenceStatus::Pending).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::action_plan::repository::StoreActionPlanRepository;
    use crate::domains::action_plan::types::ActionPlanDocument;
    use crate::domains::core::memory_store::{MemoryDocumentStore, StoreOperation};
    use crate::domains::evidence::repository::StoreEvidenceRepository;
    use crate::domains::evidence::types::Location;
    use crate::domains::pharmacy::repository::StorePharmacyRepository;
    use crate::domains::pharmacy::types::PharmacyForm;
    use crate::errors::ServiceError;
    use crate::types::{FlowCategory, Priority, UserRole};

    struct Fixture {
        store: Arc<MemoryDocumentStore>,
        plan_id: String,
        pharmacy_id: String,
        service: EvidenceService,
    }

    async fn setup() -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());
        let plans = Arc::new(StoreActionPlanRepository::new(store.clone()));
        let pharmacies = Arc::new(StorePharmacyRepository::new(store.clone()));

        let plan = plans
            .create(&ActionPlanDocument {
                title: "Vitrine de genéricos".to_string(),
                description: String::new(),
                rich_description: String::new(),
                indicator_id: "i1".to_string(),
                flow_type: FlowCategory::Revenue,
                priority: Priority::High,
                deadline: "7 dias".to_string(),
                steps: vec!["Montar".to_string()],
                products: vec![],
                requires_photo: true,
                status: None,
                created_at: None,
            })
            .await
            .unwrap();
        let form = PharmacyForm {
            name: "Central".to_string(),
            ..Default::default()
        };
        let targets = form.targets().unwrap();
        let pharmacy = pharmacies
            .create(&form.into_document(targets, Utc::now()))
            .await
            .unwrap();

        let service = EvidenceService::new(
            Arc::new(StoreEvidenceRepository::new(store.clone())),
            plans,
            pharmacies,
        );
        Fixture {
            store,
            plan_id: plan.id,
            pharmacy_id: pharmacy.id,
            service,
        }
    }

    fn validator() -> AuthContext {
        AuthContext::new("val", Some("profile-val".to_string()), "Vera", UserRole::Validator, vec![])
    }

    fn field_user(fx: &Fixture) -> AuthContext {
        AuthContext::new("op", Some("profile-op".to_string()), "Otávio", UserRole::Operational, vec![fx.pharmacy_id.clone()])
    }

    async fn submit(fx: &Fixture) -> Evidence {
        let submission = EvidenceSubmission {
            action_plan_id: fx.plan_id.clone(),
            pharmacy_id: fx.pharmacy_id.clone(),
            photo: "evidences/foto.jpg".to_string(),
            location: Some(Location {
                latitude: -8.05,
                longitude: -34.9,
                address: Some("Recife".to_string()),
            }),
        };
        fx.service.submit_evidence(&field_user(fx), submission).await.unwrap()
    }

    #[tokio::test]
    async fn test_submit_starts_pending_with_copied_names() {
        let fx = setup().await;
        let evidence = submit(&fx).await;
        assert_eq!(evidence.status, EvidenceStatus::Pending);
        assert_eq!(evidence.action_plan_title, "Vitrine de genéricos");
        assert_eq!(evidence.pharmacy_name, "Central");
        assert_eq!(evidence.user_id, "profile-op");
        assert_eq!(evidence.user_name, "Otávio");
        assert!(evidence.submitted_at.is_some());
        assert!(evidence.reviewed_at.is_none());
        assert_eq!(fx.service.pending_count(&validator()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_outside_assigned_pharmacy_is_denied() {
        let fx = setup().await;
        let outsider = AuthContext::new("op2", None, "Paula", UserRole::Operational, vec!["other".to_string()]);
        let submission = EvidenceSubmission {
            action_plan_id: fx.plan_id.clone(),
            pharmacy_id: fx.pharmacy_id.clone(),
            photo: "evidences/foto.jpg".to_string(),
            location: None,
        };
        assert!(matches!(
            fx.service.submit_evidence(&outsider, submission).await,
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(matches!(
            fx.service.list_evidences(&outsider, &EvidenceFilter::default()).await,
            Ok(list) if list.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_blank_rejection_leaves_evidence_pending() {
        let fx = setup().await;
        let evidence = submit(&fx).await;

        let err = fx.service.reject(&validator(), &evidence.id, "   ").await.unwrap_err();
        assert!(err.is_validation());
        let stored = fx.service.get_evidence(&validator(), &evidence.id).await.unwrap();
        assert_eq!(stored.status, EvidenceStatus::Pending);
        assert!(stored.reviewed_at.is_none());

        let rejected = fx
            .service
            .reject(&validator(), &evidence.id, "Foto não mostra a gôndola")
            .await
            .unwrap();
        assert_eq!(rejected.status, EvidenceStatus::Rejected);
        assert_eq!(rejected.feedback.as_deref(), Some("Foto não mostra a gôndola"));
        assert!(rejected.reviewed_at.is_some());
        assert_eq!(fx.service.pending_count(&validator()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_approve_without_feedback() {
        let fx = setup().await;
        let evidence = submit(&fx).await;

        let approved = fx.service.approve(&validator(), &evidence.id, None).await.unwrap();
        assert_eq!(approved.status, EvidenceStatus::Approved);
        assert_eq!(approved.feedback.as_deref(), Some(""));
        assert!(approved.reviewed_at.is_some());

        // final states stay final
        let err = fx.service.reject(&validator(), &evidence.id, "tarde demais").await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_only_reviewers_review() {
        let fx = setup().await;
        let evidence = submit(&fx).await;
        assert!(matches!(
            fx.service.approve(&field_user(&fx), &evidence.id, None).await,
            Err(ServiceError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_review_write_is_reported() {
        let fx = setup().await;
        let evidence = submit(&fx).await;
        fx.store.fail_on(StoreOperation::Update, "evidences").await;

        let err = fx.service.approve(&validator(), &evidence.id, Some("ok".to_string())).await.unwrap_err();
        assert_eq!(err.user_message("approve the evidence"), "Could not approve the evidence. Please try again.");
    }

    #[tokio::test]
    async fn test_list_filters_order_and_missing() {
        let fx = setup().await;
        let first = submit(&fx).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = submit(&fx).await;
        fx.service.approve(&validator(), &first.id, None).await.unwrap();

        let all = fx.service.list_evidences(&validator(), &EvidenceFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec![second.id.as_str(), first.id.as_str()]);

        let pending = EvidenceFilter {
            status: Some(EvidenceStatus::Pending),
            ..Default::default()
        };
        assert_eq!(fx.service.list_evidences(&validator(), &pending).await.unwrap().len(), 1);

        let search = EvidenceFilter {
            search: "otávio".to_string(),
            pharmacy_id: Some(fx.pharmacy_id.clone()),
            ..Default::default()
        };
        assert_eq!(fx.service.list_evidences(&validator(), &search).await.unwrap().len(), 2);

        let err = fx.service.get_evidence(&validator(), "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
