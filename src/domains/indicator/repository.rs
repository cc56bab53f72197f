use crate::domains::core::document_store::{DocumentStore, Query};
use crate::domains::core::repository::{Collection, FindById};
use crate::domains::indicator::types::{Indicator, IndicatorDocument, IndicatorPatch};
use crate::errors::DomainResult;
use crate::types::FlowCategory;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait IndicatorRepository: Send + Sync + FindById<Indicator> {
    /// Indicators in stored order, optionally limited to one flow.
    async fn find_all(&self, flow: Option<FlowCategory>) -> DomainResult<Vec<Indicator>>;

    /// Primary indicators of a flow
    async fn find_primary(&self, flow: FlowCategory) -> DomainResult<Vec<Indicator>>;

    async fn create(&self, document: &IndicatorDocument) -> DomainResult<Indicator>;

    async fn update(&self, id: &str, patch: &IndicatorPatch) -> DomainResult<Indicator>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}

pub struct StoreIndicatorRepository {
    indicators: Collection<IndicatorDocument>,
}

impl StoreIndicatorRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            indicators: Collection::new(store, "Indicator"),
        }
    }
}

#[async_trait]
impl FindById<Indicator> for StoreIndicatorRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Indicator> {
        self.indicators.get(id).await
    }
}

#[async_trait]
impl IndicatorRepository for StoreIndicatorRepository {
    async fn find_all(&self, flow: Option<FlowCategory>) -> DomainResult<Vec<Indicator>> {
        let query = match flow {
            Some(flow) => Query::new().where_eq("flowType", flow.as_str()),
            None => Query::new(),
        };
        self.indicators.list(&query).await
    }

    async fn find_primary(&self, flow: FlowCategory) -> DomainResult<Vec<Indicator>> {
        let query = Query::new()
            .where_eq("flowType", flow.as_str())
            .where_eq("isPrimary", true);
        self.indicators.list(&query).await
    }

    async fn create(&self, document: &IndicatorDocument) -> DomainResult<Indicator> {
        let id = self.indicators.insert(document).await?;
        self.indicators.get(&id).await
    }

    async fn update(&self, id: &str, patch: &IndicatorPatch) -> DomainResult<Indicator> {
        self.indicators.patch(id, patch).await?;
        self.indicators.get(id).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.indicators.remove(id).await
    }
}
