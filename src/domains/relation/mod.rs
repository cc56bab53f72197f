pub mod repository;
pub mod service;
pub mod types;

pub use repository::{RelationRepository, StoreRelationRepository};
pub use service::RelationService;
pub use types::{Relation, RelationForm, RelationListItem};
