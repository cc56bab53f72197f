pub mod service;
pub mod types;

pub use service::DashboardService;
pub use types::DashboardSummary;
