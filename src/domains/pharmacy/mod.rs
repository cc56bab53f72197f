pub mod repository;
pub mod service;
pub mod types;

pub use repository::{PharmacyRepository, StorePharmacyRepository};
pub use service::PharmacyService;
pub use types::{Pharmacy, PharmacyForm, PharmacyOption};
