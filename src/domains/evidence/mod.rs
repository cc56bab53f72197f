pub mod repository;
pub mod service;
pub mod types;

pub use repository::{EvidenceRepository, StoreEvidenceRepository};
pub use service::EvidenceService;
pub use types::{Evidence, EvidenceFilter, EvidenceStatus, EvidenceSubmission, Location, ReviewDecision};
