use crate::auth::AuthContext;
use crate::domains::action_plan::repository::ActionPlanRepository;
use crate::domains::action_plan::types::{
    ActionPlan, ActionPlanFilter, ActionPlanForm, ActionPlanListItem, ActionPlanStatus, UNKNOWN_INDICATOR,
};
use crate::domains::core::search::filter_by_search;
use crate::domains::indicator::repository::IndicatorRepository;
use crate::domains::indicator::types::Indicator;
use crate::errors::{DomainError, ServiceResult, ValidationError};
use crate::types::Permission;
use crate::validation::Validate;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

/// Plans shown in the dashboard's open-work panel
pub const DASHBOARD_PLAN_LIMIT: usize = 5;

pub struct ActionPlanService {
    plans: Arc<dyn ActionPlanRepository>,
    indicators: Arc<dyn IndicatorRepository>,
}

impl ActionPlanService {
    pub fn new(plans: Arc<dyn ActionPlanRepository>, indicators: Arc<dyn IndicatorRepository>) -> Self {
        Self { plans, indicators }
    }

    pub async fn list_plans(&self, auth: &AuthContext, filter: &ActionPlanFilter) -> ServiceResult<Vec<ActionPlanListItem>> {
        auth.authorize(Permission::ViewCatalog)?;

        let (plans, indicators) = futures::try_join!(
            self.plans.find_filtered(filter),
            self.indicators.find_all(Some(filter.flow))
        )?;
        debug!("Loaded {} action plans for {}", plans.len(), filter.flow.as_str());

        Ok(filter_by_search(plans, &filter.search)
            .into_iter()
            .map(|plan| ActionPlanListItem {
                indicator_name: indicator_name(&indicators, &plan.indicator_id),
                plan,
            })
            .collect())
    }

    pub async fn get_plan(&self, auth: &AuthContext, id: &str) -> ServiceResult<ActionPlan> {
        auth.authorize(Permission::ViewCatalog)?;
        Ok(self.plans.find_by_id(id).await?)
    }

    /// Creates a plan linked to an indicator, copying the indicator's flow.
    pub async fn create_plan(&self, auth: &AuthContext, form: ActionPlanForm) -> ServiceResult<ActionPlan> {
        auth.authorize(Permission::ManageActionPlans)?;
        form.validate()?;

        let indicator = match self.indicators.find_by_id(form.indicator_id.trim()).await {
            Ok(indicator) => indicator,
            Err(DomainError::EntityNotFound(_, _)) => {
                return Err(DomainError::from(ValidationError::invalid_value(
                    "indicatorId",
                    "indicator does not exist",
                ))
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        let plan = self
            .plans
            .create(&form.into_document(indicator.flow_type, Utc::now()))
            .await?;
        info!("Action plan {} ({}) created by {}", plan.title, plan.id, auth.uid);
        Ok(plan)
    }

    /// Open plans, most urgent first.
    pub async fn open_plans(&self, auth: &AuthContext) -> ServiceResult<Vec<ActionPlan>> {
        auth.authorize(Permission::ViewDashboard)?;
        Ok(self
            .plans
            .find_by_status(&ActionPlanStatus::open(), DASHBOARD_PLAN_LIMIT)
            .await?)
    }
}

fn indicator_name(indicators: &[Indicator], id: &str) -> String {
    indicators
        .iter()
        .find(|i| i.id == id)
        .map(|i| i.name.clone())
        .unwrap_or_else(|| UNKNOWN_INDICATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::action_plan::repository::StoreActionPlanRepository;
    use crate::domains::core::memory_store::MemoryDocumentStore;
    use crate::domains::indicator::repository::StoreIndicatorRepository;
    use crate::domains::indicator::types::IndicatorForm;
    use crate::errors::ServiceError;
    use crate::types::{FlowCategory, Priority, UserRole};

    struct Fixture {
        indicators: Arc<StoreIndicatorRepository>,
        service: ActionPlanService,
    }

    fn setup() -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());
        let indicators = Arc::new(StoreIndicatorRepository::new(store.clone()));
        let service = ActionPlanService::new(Arc::new(StoreActionPlanRepository::new(store)), indicators.clone());
        Fixture { indicators, service }
    }

    fn admin() -> AuthContext {
        AuthContext::new("admin", None, "Admin", UserRole::Admin, vec![])
    }

    async fn indicator(fx: &Fixture, name: &str, flow: FlowCategory) -> Indicator {
        let form = IndicatorForm {
            name: name.to_string(),
            flow_type: flow,
            is_primary: true,
            ..Default::default()
        };
        fx.indicators.create(&form.into_document(None)).await.unwrap()
    }

    fn form(title: &str, indicator: &str, priority: Priority) -> ActionPlanForm {
        ActionPlanForm {
            title: title.to_string(),
            description: format!("{} na loja", title),
            indicator_id: indicator.to_string(),
            priority,
            steps: vec!["Executar".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_copies_indicator_flow() {
        let fx = setup();
        let coupons = indicator(&fx, "Cupons", FlowCategory::Coupon).await;
        let plan = fx
            .service
            .create_plan(&admin(), form("Abordagem", &coupons.id, Priority::High))
            .await
            .unwrap();
        assert_eq!(plan.flow_type, FlowCategory::Coupon);
        assert!(plan.created_at.is_some());
        assert!(plan.status.is_none());
        let loaded = fx.service.get_plan(&admin(), &plan.id).await.unwrap();
        assert_eq!(loaded.title, "Abordagem");

        let err = fx
            .service
            .create_plan(&admin(), form("Órfão", "missing", Priority::Low))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_list_filters_and_search() {
        let fx = setup();
        let revenue = indicator(&fx, "Faturamento", FlowCategory::Revenue).await;
        let ticket = indicator(&fx, "Ticket", FlowCategory::Revenue).await;
        let coupons = indicator(&fx, "Cupons", FlowCategory::Coupon).await;

        for (title, ind, priority) in [
            ("Vitrine", &revenue, Priority::High),
            ("Combo", &ticket, Priority::Low),
            ("Cross-sell", &ticket, Priority::High),
            ("Fila", &coupons, Priority::High),
        ] {
            fx.service.create_plan(&admin(), form(title, &ind.id, priority)).await.unwrap();
        }

        let all_revenue = ActionPlanFilter {
            flow: FlowCategory::Revenue,
            ..Default::default()
        };
        let items = fx.service.list_plans(&admin(), &all_revenue).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].indicator_name, "Faturamento");

        let by_indicator = ActionPlanFilter {
            indicator_id: Some(ticket.id.clone()),
            priority: Some(Priority::High),
            ..all_revenue.clone()
        };
        let items = fx.service.list_plans(&admin(), &by_indicator).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].plan.title, "Cross-sell");

        let search = ActionPlanFilter {
            search: "COMBO NA".to_string(),
            ..all_revenue
        };
        assert_eq!(fx.service.list_plans(&admin(), &search).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_operational_cannot_create() {
        let fx = setup();
        let revenue = indicator(&fx, "Faturamento", FlowCategory::Revenue).await;
        let operational = AuthContext::new("op", None, "Op", UserRole::Operational, vec!["p1".to_string()]);
        assert!(matches!(
            fx.service.create_plan(&operational, form("X", &revenue.id, Priority::Low)).await,
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(fx.service.open_plans(&operational).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_indicator_name() {
        let indicators = vec![];
        assert_eq!(indicator_name(&indicators, "x"), "Desconhecido");
    }
}
