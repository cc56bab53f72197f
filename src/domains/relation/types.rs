use crate::domains::core::document_store::{collections, EntityDocument};
use crate::errors::{DomainResult, StoreResult, ValidationError};
use crate::types::{timestamp, FlowCategory};
use crate::validation::{FormValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMPACT: f64 = 0.5;
pub const MIN_IMPACT: f64 = 0.1;
pub const MAX_IMPACT: f64 = 1.0;

/// Directed, weighted influence of one indicator on another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub impact: f64,
    /// Copied from the source indicator when the relation was created
    pub flow_type: FlowCategory,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Relation {
    pub fn touches(&self, indicator_id: &str) -> bool {
        self.source_id == indicator_id || self.target_id == indicator_id
    }

    /// Impact as a whole percentage, as shown in the relations table.
    pub fn impact_percent(&self) -> u32 {
        (self.impact * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDocument {
    pub source_id: String,
    pub target_id: String,
    #[serde(default = "default_impact")]
    pub impact: f64,
    pub flow_type: FlowCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_impact() -> f64 {
    DEFAULT_IMPACT
}

impl EntityDocument for RelationDocument {
    type Entity = Relation;

    const COLLECTION: &'static str = collections::RELATIONS;

    fn into_entity(self, id: String) -> StoreResult<Relation> {
        Ok(Relation {
            id,
            source_id: self.source_id,
            target_id: self.target_id,
            impact: self.impact,
            flow_type: self.flow_type,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationForm {
    pub source_id: String,
    pub target_id: String,
    pub impact: f64,
    pub description: String,
}

impl Default for RelationForm {
    fn default() -> Self {
        Self {
            source_id: String::new(),
            target_id: String::new(),
            impact: DEFAULT_IMPACT,
            description: String::new(),
        }
    }
}

impl From<&Relation> for RelationForm {
    fn from(relation: &Relation) -> Self {
        Self {
            source_id: relation.source_id.clone(),
            target_id: relation.target_id.clone(),
            impact: relation.impact,
            description: relation.description.clone(),
        }
    }
}

impl Validate for RelationForm {
    fn validate(&self) -> DomainResult<()> {
        let mut form = FormValidator::new();

        form.check(ValidationBuilder::new("sourceId", Some(self.source_id.clone())).required());
        form.check(ValidationBuilder::new("targetId", Some(self.target_id.clone())).required());
        form.check(ValidationBuilder::new("impact", Some(self.impact)).range(MIN_IMPACT, MAX_IMPACT));

        let source = self.source_id.trim();
        if !source.is_empty() && source == self.target_id.trim() {
            form.add_error(ValidationError::invalid_value(
                "targetId",
                "an indicator cannot influence itself",
            ));
        }

        form.validate()
    }
}

/// Fields written when a relation is edited. The flow stays as created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationPatch {
    pub source_id: String,
    pub target_id: String,
    pub impact: f64,
    pub description: String,
}

impl From<RelationForm> for RelationPatch {
    fn from(form: RelationForm) -> Self {
        Self {
            source_id: form.source_id.trim().to_string(),
            target_id: form.target_id.trim().to_string(),
            impact: form.impact,
            description: form.description.trim().to_string(),
        }
    }
}

/// One row of the relations table
#[derive(Debug, Clone, Serialize)]
pub struct RelationListItem {
    pub relation: Relation,
    pub source_name: String,
    pub target_name: String,
}
