pub mod repository;
pub mod service;
pub mod types;

pub use repository::{ActionPlanRepository, StoreActionPlanRepository};
pub use service::ActionPlanService;
pub use types::{ActionPlan, ActionPlanFilter, ActionPlanForm, ActionPlanListItem, ActionPlanStatus};
