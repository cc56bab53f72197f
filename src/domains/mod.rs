pub mod action_plan;
pub mod core;
pub mod dashboard;
pub mod evidence;
pub mod indicator;
pub mod permission;
pub mod pharmacy;
pub mod relation;
pub mod user;

pub use action_plan::ActionPlanService;
pub use dashboard::DashboardService;
pub use evidence::EvidenceService;
pub use indicator::IndicatorService;
pub use pharmacy::PharmacyService;
pub use relation::RelationService;
pub use user::{User, UserService};
