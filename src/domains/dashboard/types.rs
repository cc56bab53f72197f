use crate::domains::action_plan::types::ActionPlan;
use crate::domains::pharmacy::types::PharmacyOption;
use serde::Serialize;

/// Data behind the dashboard's live panels
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSummary {
    /// Open plans, most urgent first
    pub pending_plans: Vec<ActionPlan>,
    pub pending_evidence_count: usize,
    /// Choices of the pharmacy selector
    pub pharmacies: Vec<PharmacyOption>,
}
