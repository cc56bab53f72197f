// Public modules
pub mod app;
pub mod auth;
pub mod config;
pub mod domains;
pub mod errors;
pub mod routes;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

#[cfg(test)]
pub(crate) mod testing;

pub use app::AdminApp;
pub use config::AdminConfig;

// Entry point for initialization
/// Installs logging, reads the configuration from the environment and wires
/// every service over the configured backends. Call once at start-up.
pub async fn initialize() -> errors::ServiceResult<AdminApp> {
    config::init_logging();
    let config = AdminConfig::from_env()?;
    AdminApp::initialize(&config).await
}
