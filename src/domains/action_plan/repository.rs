use crate::domains::action_plan::types::{
    sort_by_priority, ActionPlan, ActionPlanDocument, ActionPlanFilter, ActionPlanStatus,
};
use crate::domains::core::document_store::{DocumentStore, Query};
use crate::domains::core::repository::{Collection, FindById};
use crate::errors::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ActionPlanRepository: Send + Sync + FindById<ActionPlan> {
    /// Plans matching the flow, indicator and priority filters. The search term is not applied here.
    async fn find_filtered(&self, filter: &ActionPlanFilter) -> DomainResult<Vec<ActionPlan>>;

    /// Plans whose status is one of `statuses`, most urgent first, at most `limit`.
    async fn find_by_status(&self, statuses: &[ActionPlanStatus], limit: usize) -> DomainResult<Vec<ActionPlan>>;

    async fn create(&self, document: &ActionPlanDocument) -> DomainResult<ActionPlan>;
}

pub struct StoreActionPlanRepository {
    plans: Collection<ActionPlanDocument>,
}

impl StoreActionPlanRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            plans: Collection::new(store, "ActionPlan"),
        }
    }
}

#[async_trait]
impl FindById<ActionPlan> for StoreActionPlanRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<ActionPlan> {
        self.plans.get(id).await
    }
}

#[async_trait]
impl ActionPlanRepository for StoreActionPlanRepository {
    async fn find_filtered(&self, filter: &ActionPlanFilter) -> DomainResult<Vec<ActionPlan>> {
        let mut query = Query::new().where_eq("flowType", filter.flow.as_str());
        if let Some(indicator_id) = &filter.indicator_id {
            query = query.where_eq("indicatorId", indicator_id.as_str());
        }
        if let Some(priority) = filter.priority {
            query = query.where_eq("priority", priority.as_str());
        }
        self.plans.list(&query).await
    }

    async fn find_by_status(&self, statuses: &[ActionPlanStatus], limit: usize) -> DomainResult<Vec<ActionPlan>> {
        let query = Query::new().where_in("status", statuses.iter().map(|s| s.as_str()));
        // priority values do not sort alphabetically, so ranking happens here
        let mut plans = self.plans.list(&query).await?;
        sort_by_priority(&mut plans);
        plans.truncate(limit);
        Ok(plans)
    }

    async fn create(&self, document: &ActionPlanDocument) -> DomainResult<ActionPlan> {
        let id = self.plans.insert(document).await?;
        self.plans.get(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::core::memory_store::MemoryDocumentStore;
    use crate::types::{FlowCategory, Priority};
    use chrono::Utc;

    fn document(title: &str, priority: Priority, status: Option<ActionPlanStatus>) -> ActionPlanDocument {
        ActionPlanDocument {
            title: title.to_string(),
            description: String::new(),
            rich_description: String::new(),
            indicator_id: "i1".to_string(),
            flow_type: FlowCategory::Revenue,
            priority,
            deadline: "7 dias".to_string(),
            steps: vec!["passo".to_string()],
            products: vec![],
            requires_photo: true,
            status,
            created_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_open_plans_ranked_by_priority() {
        let repo = StoreActionPlanRepository::new(Arc::new(MemoryDocumentStore::new()));
        let pending = Some(ActionPlanStatus::Pending);
        let in_progress = Some(ActionPlanStatus::InProgress);

        repo.create(&document("low", Priority::Low, pending)).await.unwrap();
        repo.create(&document("medium", Priority::Medium, in_progress)).await.unwrap();
        repo.create(&document("done", Priority::High, Some(ActionPlanStatus::Completed))).await.unwrap();
        repo.create(&document("none", Priority::High, None)).await.unwrap();
        repo.create(&document("high", Priority::High, pending)).await.unwrap();

        let open = repo.find_by_status(&ActionPlanStatus::open(), 5).await.unwrap();
        let titles: Vec<&str> = open.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "medium", "low"]);

        let top = repo.find_by_status(&ActionPlanStatus::open(), 1).await.unwrap();
        assert_eq!(top[0].title, "high");
    }
}
