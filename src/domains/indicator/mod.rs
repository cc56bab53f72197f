pub mod graph;
pub mod repository;
pub mod service;
pub mod types;

pub use graph::{extract_neighborhood, GraphLink, GraphNode, IndicatorGraph, NodeRole};
pub use repository::{IndicatorRepository, StoreIndicatorRepository};
pub use service::IndicatorService;
pub use types::{Indicator, IndicatorForm, IndicatorListItem, IndicatorStatus};
