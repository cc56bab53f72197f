pub mod repository;
pub mod service;
pub mod types;

// Re-export main items for other domains to use
pub use repository::{StoreUserRepository, UserRepository};
pub use service::UserService;
pub use types::{User, UserFilter, UserForm, UserListItem};
