use crate::domains::core::document_store::{Direction, DocumentStore, Query};
use crate::domains::core::repository::{Collection, FindById};
use crate::domains::pharmacy::types::{LogoPatch, Pharmacy, PharmacyDocument};
use crate::errors::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PharmacyRepository: Send + Sync + FindById<Pharmacy> {
    /// All pharmacies ordered by name
    async fn find_all(&self) -> DomainResult<Vec<Pharmacy>>;

    async fn create(&self, document: &PharmacyDocument) -> DomainResult<Pharmacy>;

    async fn set_logo_path(&self, id: &str, logo_path: &str) -> DomainResult<()>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}

pub struct StorePharmacyRepository {
    pharmacies: Collection<PharmacyDocument>,
}

impl StorePharmacyRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            pharmacies: Collection::new(store, "Pharmacy"),
        }
    }
}

#[async_trait]
impl FindById<Pharmacy> for StorePharmacyRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Pharmacy> {
        self.pharmacies.get(id).await
    }
}

#[async_trait]
impl PharmacyRepository for StorePharmacyRepository {
    async fn find_all(&self) -> DomainResult<Vec<Pharmacy>> {
        self.pharmacies
            .list(&Query::new().order_by("name", Direction::Asc))
            .await
    }

    async fn create(&self, document: &PharmacyDocument) -> DomainResult<Pharmacy> {
        let id = self.pharmacies.insert(document).await?;
        self.pharmacies.get(&id).await
    }

    async fn set_logo_path(&self, id: &str, logo_path: &str) -> DomainResult<()> {
        let patch = LogoPatch {
            logo_path: logo_path.to_string(),
        };
        self.pharmacies.patch(id, &patch).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.pharmacies.remove(id).await
    }
}
