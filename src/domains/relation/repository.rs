use crate::domains::core::document_store::{DocumentStore, Query};
use crate::domains::core::repository::{Collection, FindById};
use crate::domains::relation::types::{Relation, RelationDocument, RelationPatch};
use crate::errors::DomainResult;
use crate::types::FlowCategory;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait RelationRepository: Send + Sync + FindById<Relation> {
    /// Relations in stored order, optionally limited to one flow.
    async fn find_all(&self, flow: Option<FlowCategory>) -> DomainResult<Vec<Relation>>;

    async fn create(&self, document: &RelationDocument) -> DomainResult<Relation>;

    async fn update(&self, id: &str, patch: &RelationPatch) -> DomainResult<Relation>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}

pub struct StoreRelationRepository {
    relations: Collection<RelationDocument>,
}

impl StoreRelationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            relations: Collection::new(store, "Relation"),
        }
    }
}

#[async_trait]
impl FindById<Relation> for StoreRelationRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Relation> {
        self.relations.get(id).await
    }
}

#[async_trait]
impl RelationRepository for StoreRelationRepository {
    async fn find_all(&self, flow: Option<FlowCategory>) -> DomainResult<Vec<Relation>> {
        let query = match flow {
            Some(flow) => Query::new().where_eq("flowType", flow.as_str()),
            None => Query::new(),
        };
        self.relations.list(&query).await
    }

    async fn create(&self, document: &RelationDocument) -> DomainResult<Relation> {
        let id = self.relations.insert(document).await?;
        self.relations.get(&id).await
    }

    async fn update(&self, id: &str, patch: &RelationPatch) -> DomainResult<Relation> {
        self.relations.patch(id, patch).await?;
        self.relations.get(id).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.relations.remove(id).await
    }
}
