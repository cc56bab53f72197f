use crate::errors::{ServiceError, ServiceResult};
use log::debug;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://farmup_admin.db";
pub const DEFAULT_STORAGE_PATH: &str = "./storage";
pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
/// Password given to newly provisioned accounts until the user resets it
pub const DEFAULT_TEMPORARY_PASSWORD: &str = "ChangeMe123!";

/// Process configuration, read from `FARMUP_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminConfig {
    pub database_url: String,
    pub storage_path: PathBuf,
    pub identity_api_key: String,
    pub identity_base_url: String,
    pub temporary_password: String,
}

impl AdminConfig {
    /// Loads `.env` if present, then reads the environment.
    pub fn from_env() -> ServiceResult<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Only the identity API key
    /// has no default.
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let identity_api_key = lookup("FARMUP_IDENTITY_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ServiceError::Configuration("FARMUP_IDENTITY_API_KEY is not set".to_string())
            })?;

        Ok(Self {
            database_url: read("FARMUP_DATABASE_URL", DEFAULT_DATABASE_URL),
            storage_path: PathBuf::from(read("FARMUP_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
            identity_api_key,
            identity_base_url: read("FARMUP_IDENTITY_BASE_URL", DEFAULT_IDENTITY_BASE_URL),
            temporary_password: read("FARMUP_TEMPORARY_PASSWORD", DEFAULT_TEMPORARY_PASSWORD),
        })
    }
}

/// Installs `env_logger`. `RUST_LOG` wins; otherwise debug builds log at
/// `debug` and release builds at `info`. Calling it again is a no-op.
pub fn init_logging() {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AdminConfig::from_lookup(lookup(&[("FARMUP_IDENTITY_API_KEY", "key-123")])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.storage_path, PathBuf::from("./storage"));
        assert_eq!(config.temporary_password, "ChangeMe123!");
        assert_eq!(config.identity_api_key, "key-123");
    }

    #[test]
    fn test_overrides() {
        let config = AdminConfig::from_lookup(lookup(&[
            ("FARMUP_IDENTITY_API_KEY", "key"),
            ("FARMUP_DATABASE_URL", "sqlite::memory:"),
            ("FARMUP_TEMPORARY_PASSWORD", "  "),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        // blank values fall back to the default
        assert_eq!(config.temporary_password, DEFAULT_TEMPORARY_PASSWORD);
    }

    #[test]
    fn test_missing_api_key() {
        let err = AdminConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
