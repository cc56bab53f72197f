pub mod context;
pub mod identity;
pub mod service;
pub mod session;
pub mod token;

// Re-export public items
pub use context::AuthContext;
pub use identity::{IdentityAccount, IdentityProvider, IdentitySession, RestIdentityProvider};
pub use service::{AuthService, Credentials, CurrentUser};
pub use session::{SessionContext, SessionState};
