use crate::domains::core::document_store::{Direction, DocumentStore, Query};
use crate::domains::core::repository::{Collection, FindById};
use crate::domains::evidence::types::{Evidence, EvidenceDocument, EvidenceFilter, EvidenceStatus, ReviewPatch};
use crate::errors::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait EvidenceRepository: Send + Sync + FindById<Evidence> {
    /// Evidences matching the status/pharmacy filters, newest submission first.
    async fn find_filtered(&self, filter: &EvidenceFilter) -> DomainResult<Vec<Evidence>>;

    async fn count_by_status(&self, status: EvidenceStatus) -> DomainResult<usize>;

    async fn create(&self, document: &EvidenceDocument) -> DomainResult<Evidence>;

    async fn record_review(&self, id: &str, patch: &ReviewPatch) -> DomainResult<Evidence>;
}

pub struct StoreEvidenceRepository {
    evidences: Collection<EvidenceDocument>,
}

impl StoreEvidenceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            evidences: Collection::new(store, "Evidence"),
        }
    }
}

#[async_trait]
impl FindById<Evidence> for StoreEvidenceRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Evidence> {
        self.evidences.get(id).await
    }
}

#[async_trait]
impl EvidenceRepository for StoreEvidenceRepository {
    async fn find_filtered(&self, filter: &EvidenceFilter) -> DomainResult<Vec<Evidence>> {
        let mut query = Query::new().order_by("submittedAt", Direction::Desc);
        if let Some(status) = filter.status {
            query = query.where_eq("status", status.as_str());
        }
        if let Some(pharmacy_id) = &filter.pharmacy_id {
            query = query.where_eq("pharmacyId", pharmacy_id.as_str());
        }
        self.evidences.list(&query).await
    }

    async fn count_by_status(&self, status: EvidenceStatus) -> DomainResult<usize> {
        self.evidences
            .count(&Query::new().where_eq("status", status.as_str()))
            .await
    }

    async fn create(&self, document: &EvidenceDocument) -> DomainResult<Evidence> {
        let id = self.evidences.insert(document).await?;
        self.evidences.get(&id).await
    }

    async fn record_review(&self, id: &str, patch: &ReviewPatch) -> DomainResult<Evidence> {
        self.evidences.patch(id, patch).await?;
        self.evidences.get(id).await
    }
}
