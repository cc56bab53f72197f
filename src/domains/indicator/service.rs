use crate::auth::AuthContext;
use crate::domains::core::search::filter_by_search;
use crate::domains::indicator::graph::{extract_neighborhood, IndicatorGraph};
use crate::domains::indicator::repository::IndicatorRepository;
use crate::domains::indicator::types::{
    default_central, parent_name, Indicator, IndicatorForm, IndicatorListItem, IndicatorPatch,
};
use crate::domains::relation::repository::RelationRepository;
use crate::errors::ServiceResult;
use crate::types::{Confirmation, FlowCategory, Permission};
use crate::validation::Validate;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

pub struct IndicatorService {
    indicators: Arc<dyn IndicatorRepository>,
    relations: Arc<dyn RelationRepository>,
}

impl IndicatorService {
    pub fn new(indicators: Arc<dyn IndicatorRepository>, relations: Arc<dyn RelationRepository>) -> Self {
        Self { indicators, relations }
    }

    /// Indicators of a flow (or all), narrowed by name, each with its parent's name.
    pub async fn list_indicators(
        &self,
        auth: &AuthContext,
        flow: Option<FlowCategory>,
        search: &str,
    ) -> ServiceResult<Vec<IndicatorListItem>> {
        auth.authorize(Permission::ViewCatalog)?;

        // parents may sit in another flow, so names resolve against the full catalog
        let all = self.indicators.find_all(None).await?;
        let selected: Vec<Indicator> = all
            .iter()
            .filter(|i| flow.map_or(true, |f| i.flow_type == f))
            .cloned()
            .collect();
        debug!("Loaded {} of {} indicators", selected.len(), all.len());

        Ok(filter_by_search(selected, search)
            .into_iter()
            .map(|indicator| IndicatorListItem {
                parent_name: parent_name(&all, indicator.parent_id.as_deref()),
                indicator,
            })
            .collect())
    }

    pub async fn get_indicator(&self, auth: &AuthContext, id: &str) -> ServiceResult<Indicator> {
        auth.authorize(Permission::ViewCatalog)?;
        Ok(self.indicators.find_by_id(id).await?)
    }

    /// Indicators an action plan can be linked to: the primary ones of the flow.
    pub async fn selectable_for_plans(&self, auth: &AuthContext, flow: FlowCategory) -> ServiceResult<Vec<Indicator>> {
        auth.authorize(Permission::ViewCatalog)?;
        Ok(self.indicators.find_primary(flow).await?)
    }

    pub async fn create_indicator(&self, auth: &AuthContext, form: IndicatorForm) -> ServiceResult<Indicator> {
        auth.authorize(Permission::ManageIndicators)?;
        form.validate()?;
        let indicator = self
            .indicators
            .create(&form.into_document(Some(Utc::now())))
            .await?;
        info!("Indicator {} ({}) created by {}", indicator.name, indicator.id, auth.uid);
        Ok(indicator)
    }

    pub async fn update_indicator(&self, auth: &AuthContext, id: &str, form: IndicatorForm) -> ServiceResult<Indicator> {
        auth.authorize(Permission::ManageIndicators)?;
        form.validate_for(id)?;
        let indicator = self.indicators.update(id, &IndicatorPatch::from(form)).await?;
        info!("Indicator {} updated by {}", id, auth.uid);
        Ok(indicator)
    }

    /// Deletes the indicator alone. Relations, child indicators and action plans
    /// that reference it keep the dangling id.
    pub async fn delete_indicator(&self, auth: &AuthContext, id: &str, confirmation: Confirmation) -> ServiceResult<()> {
        auth.authorize(Permission::ManageIndicators)?;
        confirmation.require("delete indicator")?;
        self.indicators.delete(id).await?;
        info!("Indicator {} deleted by {}", id, auth.uid);
        Ok(())
    }

    /// Neighborhood graph of a flow around `central_id`, or around the flow's
    /// first root indicator when none is selected. Empty when the flow has no
    /// indicator to center on.
    pub async fn graph(
        &self,
        auth: &AuthContext,
        flow: FlowCategory,
        central_id: Option<&str>,
    ) -> ServiceResult<IndicatorGraph> {
        auth.authorize(Permission::ViewCatalog)?;

        let (indicators, relations) = futures::try_join!(
            self.indicators.find_all(None),
            self.relations.find_all(None)
        )?;

        let central = match central_id {
            Some(id) => id.to_string(),
            None => match default_central(&indicators, flow) {
                Some(root) => root.id.clone(),
                None => return Ok(IndicatorGraph::default()),
            },
        };

        let graph = extract_neighborhood(&indicators, &relations, &central, flow);
        debug!(
            "Graph around {} in {}: {} nodes, {} links",
            central,
            flow.as_str(),
            graph.nodes.len(),
            graph.links.len()
        );
        Ok(graph)
    }
}
