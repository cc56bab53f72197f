use crate::auth::AuthContext;
use crate::domains::indicator::repository::IndicatorRepository;
use crate::domains::indicator::types::Indicator;
use crate::domains::relation::repository::RelationRepository;
use crate::domains::relation::types::{Relation, RelationDocument, RelationForm, RelationListItem, RelationPatch};
use crate::errors::{DomainError, ServiceResult, ValidationError};
use crate::types::{Confirmation, FlowCategory, Permission};
use crate::validation::Validate;
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Shown for an endpoint whose indicator no longer exists.
pub const UNKNOWN_INDICATOR: &str = "-";

pub struct RelationService {
    relations: Arc<dyn RelationRepository>,
    indicators: Arc<dyn IndicatorRepository>,
}

impl RelationService {
    pub fn new(relations: Arc<dyn RelationRepository>, indicators: Arc<dyn IndicatorRepository>) -> Self {
        Self { relations, indicators }
    }

    /// Relations of a flow with their endpoint names resolved.
    pub async fn list_relations(&self, auth: &AuthContext, flow: FlowCategory) -> ServiceResult<Vec<RelationListItem>> {
        auth.authorize(Permission::ViewCatalog)?;

        let (relations, indicators) = futures::try_join!(
            self.relations.find_all(Some(flow)),
            self.indicators.find_all(None)
        )?;
        debug!("Loaded {} relations for {}", relations.len(), flow.as_str());

        let names: HashMap<&str, &str> = indicators
            .iter()
            .map(|i| (i.id.as_str(), i.name.as_str()))
            .collect();
        let name_of = |id: &str| names.get(id).copied().unwrap_or(UNKNOWN_INDICATOR).to_string();

        Ok(relations
            .into_iter()
            .map(|relation| RelationListItem {
                source_name: name_of(&relation.source_id),
                target_name: name_of(&relation.target_id),
                relation,
            })
            .collect())
    }

    pub async fn get_relation(&self, auth: &AuthContext, id: &str) -> ServiceResult<Relation> {
        auth.authorize(Permission::ViewCatalog)?;
        Ok(self.relations.find_by_id(id).await?)
    }

    async fn source_indicator(&self, source_id: &str) -> ServiceResult<Indicator> {
        match self.indicators.find_by_id(source_id).await {
            Ok(indicator) => Ok(indicator),
            Err(DomainError::EntityNotFound(_, _)) => {
                warn!("Relation source indicator {} does not exist", source_id);
                Err(DomainError::from(ValidationError::invalid_value(
                    "sourceId",
                    "indicator does not exist",
                ))
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates a relation. Its flow is copied from the source indicator and is
    /// not updated if the indicator later moves to another flow.
    pub async fn create_relation(&self, auth: &AuthContext, form: RelationForm) -> ServiceResult<Relation> {
        auth.authorize(Permission::ManageRelations)?;
        form.validate()?;

        let source = self.source_indicator(form.source_id.trim()).await?;
        let patch = RelationPatch::from(form);
        let document = RelationDocument {
            source_id: patch.source_id,
            target_id: patch.target_id,
            impact: patch.impact,
            flow_type: source.flow_type,
            description: patch.description,
            created_at: Some(Utc::now()),
        };
        let relation = self.relations.create(&document).await?;
        info!(
            "Relation {} -> {} ({}) created by {}",
            relation.source_id, relation.target_id, relation.id, auth.uid
        );
        Ok(relation)
    }

    pub async fn update_relation(&self, auth: &AuthContext, id: &str, form: RelationForm) -> ServiceResult<Relation> {
        auth.authorize(Permission::ManageRelations)?;
        form.validate()?;
        let relation = self.relations.update(id, &RelationPatch::from(form)).await?;
        info!("Relation {} updated by {}", id, auth.uid);
        Ok(relation)
    }

    pub async fn delete_relation(&self, auth: &AuthContext, id: &str, confirmation: Confirmation) -> ServiceResult<()> {
        auth.authorize(Permission::ManageRelations)?;
        confirmation.require("delete relation")?;
        self.relations.delete(id).await?;
        info!("Relation {} deleted by {}", id, auth.uid);
        Ok(())
    }
}
