use crate::domains::core::document_store::{collections, EntityDocument};
use crate::domains::core::search::Searchable;
use crate::errors::{DomainResult, StoreResult, ValidationError};
use crate::types::{timestamp, FlowCategory, Priority};
use crate::validation::{FormValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEADLINE: &str = "7 dias";

/// Shown for a plan whose indicator no longer exists.
pub const UNKNOWN_INDICATOR: &str = "Desconhecido";

/// Execution state of a plan. Plans created from the console carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPlanStatus {
    Pending,
    InProgress,
    Completed,
    Validated,
    Rejected,
}

impl ActionPlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionPlanStatus::Pending => "pending",
            ActionPlanStatus::InProgress => "in_progress",
            ActionPlanStatus::Completed => "completed",
            ActionPlanStatus::Validated => "validated",
            ActionPlanStatus::Rejected => "rejected",
        }
    }

    /// Statuses shown as open work on the dashboard
    pub fn open() -> [ActionPlanStatus; 2] {
        [ActionPlanStatus::Pending, ActionPlanStatus::InProgress]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: String,
    pub title: String,
    pub description: String,
    /// HTML produced by the rich-text editor
    pub rich_description: String,
    pub indicator_id: String,
    /// Copied from the indicator when the plan was created
    pub flow_type: FlowCategory,
    pub priority: Priority,
    /// Free text, e.g. "7 dias"
    pub deadline: String,
    pub steps: Vec<String>,
    pub products: Vec<String>,
    pub requires_photo: bool,
    pub status: Option<ActionPlanStatus>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Searchable for ActionPlan {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlanDocument {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rich_description: String,
    pub indicator_id: String,
    pub flow_type: FlowCategory,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default = "default_requires_photo")]
    pub requires_photo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionPlanStatus>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_requires_photo() -> bool {
    true
}

impl EntityDocument for ActionPlanDocument {
    type Entity = ActionPlan;

    const COLLECTION: &'static str = collections::ACTION_PLANS;

    fn into_entity(self, id: String) -> StoreResult<ActionPlan> {
        Ok(ActionPlan {
            id,
            title: self.title,
            description: self.description,
            rich_description: self.rich_description,
            indicator_id: self.indicator_id,
            flow_type: self.flow_type,
            priority: self.priority,
            deadline: self.deadline,
            steps: self.steps,
            products: self.products,
            requires_photo: self.requires_photo,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

/// Create form of the action-plan page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlanForm {
    pub title: String,
    pub description: String,
    pub rich_description: String,
    pub indicator_id: String,
    pub priority: Priority,
    pub deadline: String,
    pub steps: Vec<String>,
    pub products: Vec<String>,
    pub requires_photo: bool,
    pub status: Option<ActionPlanStatus>,
}

impl Default for ActionPlanForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            rich_description: String::new(),
            indicator_id: String::new(),
            priority: Priority::Medium,
            deadline: DEFAULT_DEADLINE.to_string(),
            steps: vec![String::new()],
            products: Vec::new(),
            requires_photo: true,
            status: None,
        }
    }
}

impl ActionPlanForm {
    /// Appends a product typed in the product box; blank input is ignored.
    pub fn add_product(&mut self, product: &str) {
        let product = product.trim();
        if !product.is_empty() {
            self.products.push(product.to_string());
        }
    }

    pub fn into_document(self, flow_type: FlowCategory, created_at: DateTime<Utc>) -> ActionPlanDocument {
        ActionPlanDocument {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            rich_description: self.rich_description,
            indicator_id: self.indicator_id.trim().to_string(),
            flow_type,
            priority: self.priority,
            deadline: self.deadline.trim().to_string(),
            steps: self.steps.iter().map(|s| s.trim().to_string()).collect(),
            products: self
                .products
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            requires_photo: self.requires_photo,
            status: self.status,
            created_at: Some(created_at),
        }
    }
}

impl Validate for ActionPlanForm {
    fn validate(&self) -> DomainResult<()> {
        let mut form = FormValidator::new();

        form.check(ValidationBuilder::new("title", Some(self.title.clone())).required());
        form.check(ValidationBuilder::new("description", Some(self.description.clone())).required());
        form.check(ValidationBuilder::new("indicatorId", Some(self.indicator_id.clone())).required());

        if self.steps.is_empty() {
            form.add_error(ValidationError::required("step_0"));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.trim().is_empty() {
                form.add_error(ValidationError::required(&format!("step_{}", index)));
            }
        }

        form.validate()
    }
}

/// Filters of the action-plan list. The flow is always applied.
#[derive(Debug, Clone, Default)]
pub struct ActionPlanFilter {
    pub flow: FlowCategory,
    pub indicator_id: Option<String>,
    pub priority: Option<Priority>,
    pub search: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionPlanListItem {
    pub plan: ActionPlan,
    pub indicator_name: String,
}

/// Sorts plans most urgent first, keeping stored order within a priority.
pub fn sort_by_priority(plans: &mut [ActionPlan]) {
    plans.sort_by_key(|plan| plan.priority.rank());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::core::document_store::{decode, StoredDocument};
    use crate::errors::DomainError;
    use serde_json::{json, Value};

    fn valid_form() -> ActionPlanForm {
        ActionPlanForm {
            title: "Expor genéricos".to_string(),
            description: "Reorganizar gôndola".to_string(),
            indicator_id: "i1".to_string(),
            steps: vec!["Separar produtos".to_string(), "Montar ponta".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let form = ActionPlanForm::default();
        assert_eq!(form.deadline, "7 dias");
        assert_eq!(form.priority, Priority::Medium);
        assert!(form.requires_photo);
        assert_eq!(form.steps.len(), 1);
    }

    #[test]
    fn test_empty_steps_are_keyed_by_index() {
        let form = ActionPlanForm {
            steps: vec!["ok".to_string(), "  ".to_string(), String::new()],
            ..valid_form()
        };
        match form.validate() {
            Err(DomainError::Form(errors)) => {
                assert!(!errors.contains("step_0"));
                assert!(errors.contains("step_1"));
                assert!(errors.contains("step_2"));
            }
            other => panic!("expected form errors, got {:?}", other),
        }
    }

    #[test]
    fn test_required_fields() {
        match ActionPlanForm::default().validate() {
            Err(DomainError::Form(errors)) => {
                for field in ["title", "description", "indicatorId", "step_0"] {
                    assert!(errors.contains(field), "missing {}", field);
                }
            }
            other => panic!("expected form errors, got {:?}", other),
        }
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_products_are_trimmed() {
        let mut form = valid_form();
        form.add_product("  Dipirona ");
        form.add_product("   ");
        form.products.push(" ".to_string());
        let doc = form.into_document(FlowCategory::Coupon, Utc::now());
        assert_eq!(doc.products, vec!["Dipirona"]);
        assert_eq!(doc.flow_type, FlowCategory::Coupon);
    }

    #[test]
    fn test_decode_status() {
        let map = match json!({
            "title": "T", "indicatorId": "i1", "flowType": "cupom",
            "priority": "high", "status": "in_progress"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let plan = decode::<ActionPlanDocument>(StoredDocument::new("p1", map)).unwrap();
        assert_eq!(plan.status, Some(ActionPlanStatus::InProgress));
        assert_eq!(plan.priority, Priority::High);
        assert!(plan.requires_photo);
    }
}
