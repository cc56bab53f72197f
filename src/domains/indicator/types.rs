use crate::domains::core::document_store::{collections, EntityDocument};
use crate::domains::core::search::Searchable;
use crate::errors::{DomainResult, StoreResult, ValidationError};
use crate::types::{timestamp, FlowCategory};
use crate::validation::{FormValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown when an indicator has no parent or its parent is gone.
pub const NO_PARENT: &str = "-";

/// Where an indicator stands against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    Above,
    Below,
    Neutral,
}

impl IndicatorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorStatus::Above => "above",
            IndicatorStatus::Below => "below",
            IndicatorStatus::Neutral => "neutral",
        }
    }
}

/// Current value or target of an indicator. Stored either as a number or as
/// preformatted text ("R$ 95,00").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(f64),
    Text(String),
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Number(n) => write!(f, "{}", n),
            Measure::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Root metric of a flow, as opposed to one derived from others
    pub is_primary: bool,
    pub icon: String,
    pub flow_type: FlowCategory,
    /// Not checked for cycles
    pub parent_id: Option<String>,
    pub status: Option<IndicatorStatus>,
    pub value: Option<Measure>,
    pub target: Option<Measure>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Indicator {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Searchable for Indicator {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

/// Stored shape of an `indicators` document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub icon: String,
    pub flow_type: FlowCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IndicatorStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Measure>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl EntityDocument for IndicatorDocument {
    type Entity = Indicator;

    const COLLECTION: &'static str = collections::INDICATORS;

    fn into_entity(self, id: String) -> StoreResult<Indicator> {
        Ok(Indicator {
            id,
            name: self.name,
            description: self.description,
            is_primary: self.is_primary,
            icon: self.icon,
            flow_type: self.flow_type,
            // an empty parent reference means "no parent"
            parent_id: self.parent_id.filter(|p| !p.is_empty()),
            status: self.status,
            value: self.value,
            target: self.target,
            created_at: self.created_at,
        })
    }
}

/// Create/edit dialog payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorForm {
    pub name: String,
    pub description: String,
    pub is_primary: bool,
    pub icon: String,
    pub flow_type: FlowCategory,
    pub parent_id: Option<String>,
    pub status: Option<IndicatorStatus>,
    pub value: Option<Measure>,
    pub target: Option<Measure>,
}

impl IndicatorForm {
    pub fn normalized_parent(&self) -> Option<String> {
        self.parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }

    /// Rejects making an indicator its own parent.
    pub fn validate_for(&self, indicator_id: &str) -> DomainResult<()> {
        self.validate()?;
        if self.normalized_parent().as_deref() == Some(indicator_id) {
            return Err(ValidationError::invalid_value("parentId", "an indicator cannot be its own parent").into());
        }
        Ok(())
    }

    pub fn into_document(self, created_at: Option<DateTime<Utc>>) -> IndicatorDocument {
        let parent_id = self.normalized_parent();
        IndicatorDocument {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            is_primary: self.is_primary,
            icon: self.icon,
            flow_type: self.flow_type,
            parent_id,
            status: self.status,
            value: self.value,
            target: self.target,
            created_at,
        }
    }
}

impl From<&Indicator> for IndicatorForm {
    fn from(indicator: &Indicator) -> Self {
        Self {
            name: indicator.name.clone(),
            description: indicator.description.clone(),
            is_primary: indicator.is_primary,
            icon: indicator.icon.clone(),
            flow_type: indicator.flow_type,
            parent_id: indicator.parent_id.clone(),
            status: indicator.status,
            value: indicator.value.clone(),
            target: indicator.target.clone(),
        }
    }
}

impl Validate for IndicatorForm {
    fn validate(&self) -> DomainResult<()> {
        let mut form = FormValidator::new();
        form.check(
            ValidationBuilder::new("name", Some(self.name.clone()))
                .required()
                .max_length(120),
        );
        form.validate()
    }
}

/// Fields written when an indicator is edited. A cleared parent is stored as null.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorPatch {
    pub name: String,
    pub description: String,
    pub is_primary: bool,
    pub icon: String,
    pub flow_type: FlowCategory,
    pub parent_id: Option<String>,
    pub status: Option<IndicatorStatus>,
    pub value: Option<Measure>,
    pub target: Option<Measure>,
}

impl From<IndicatorForm> for IndicatorPatch {
    fn from(form: IndicatorForm) -> Self {
        let parent_id = form.normalized_parent();
        Self {
            name: form.name.trim().to_string(),
            description: form.description.trim().to_string(),
            is_primary: form.is_primary,
            icon: form.icon,
            flow_type: form.flow_type,
            parent_id,
            status: form.status,
            value: form.value,
            target: form.target,
        }
    }
}

/// One row of the indicators table
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorListItem {
    pub indicator: Indicator,
    pub parent_name: String,
}

/// Name of the parent indicator, `-` when there is none or it no longer exists.
pub fn parent_name(indicators: &[Indicator], parent_id: Option<&str>) -> String {
    parent_id
        .and_then(|id| indicators.iter().find(|i| i.id == id))
        .map(|parent| parent.name.clone())
        .unwrap_or_else(|| NO_PARENT.to_string())
}

/// First indicator of the flow without a parent, in stored order.
pub fn default_central(indicators: &[Indicator], flow: FlowCategory) -> Option<&Indicator> {
    indicators
        .iter()
        .find(|i| i.flow_type == flow && i.is_root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::core::document_store::{decode, StoredDocument};
    use crate::errors::{DomainError, StoreError};
    use serde_json::{json, Value};

    fn indicator(id: &str, flow: FlowCategory, parent: Option<&str>) -> Indicator {
        Indicator {
            id: id.to_string(),
            name: format!("Indicador {}", id),
            description: String::new(),
            is_primary: false,
            icon: String::new(),
            flow_type: flow,
            parent_id: parent.map(str::to_string),
            status: None,
            value: None,
            target: None,
            created_at: None,
        }
    }

    fn fields(value: Value) -> crate::domains::core::document_store::Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_decode_measures_and_empty_parent() {
        let doc = StoredDocument::new(
            "i1",
            fields(json!({
                "name": "Ticket médio",
                "flowType": "faturamento",
                "parentId": "",
                "status": "below",
                "value": 87.5,
                "target": "R$ 95,00"
            })),
        );
        let indicator = decode::<IndicatorDocument>(doc).unwrap();
        assert!(indicator.is_root());
        assert_eq!(indicator.status, Some(IndicatorStatus::Below));
        assert_eq!(indicator.value, Some(Measure::Number(87.5)));
        assert_eq!(indicator.target.unwrap().to_string(), "R$ 95,00");
    }

    #[test]
    fn test_decode_rejects_unknown_flow() {
        let doc = StoredDocument::new("i1", fields(json!({"name": "X", "flowType": "estoque"})));
        assert!(matches!(
            decode::<IndicatorDocument>(doc),
            Err(StoreError::Decode { .. })
        ));
    }

    #[test]
    fn test_parent_name() {
        let indicators = vec![
            indicator("a", FlowCategory::Revenue, None),
            indicator("b", FlowCategory::Revenue, Some("a")),
        ];
        assert_eq!(parent_name(&indicators, Some("a")), "Indicador a");
        assert_eq!(parent_name(&indicators, Some("gone")), "-");
        assert_eq!(parent_name(&indicators, None), "-");
    }

    #[test]
    fn test_default_central_is_first_root_of_flow() {
        let indicators = vec![
            indicator("c1", FlowCategory::Coupon, None),
            indicator("r1", FlowCategory::Revenue, Some("r2")),
            indicator("r2", FlowCategory::Revenue, None),
            indicator("r3", FlowCategory::Revenue, None),
        ];
        assert_eq!(default_central(&indicators, FlowCategory::Revenue).unwrap().id, "r2");
        assert_eq!(default_central(&indicators, FlowCategory::Coupon).unwrap().id, "c1");
        assert!(default_central(&indicators[1..2], FlowCategory::Revenue).is_none());
    }

    #[test]
    fn test_form_rejects_self_parent() {
        let form = IndicatorForm {
            name: "Ticket".to_string(),
            parent_id: Some("i1".to_string()),
            ..Default::default()
        };
        assert!(form.validate_for("i2").is_ok());
        assert!(matches!(form.validate_for("i1"), Err(DomainError::Validation(_))));

        let blank = IndicatorForm::default();
        assert!(matches!(blank.validate(), Err(DomainError::Form(e)) if e.contains("name")));
    }
}
