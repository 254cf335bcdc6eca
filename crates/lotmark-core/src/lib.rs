use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod credential;
pub mod rate_limit;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use credential::{
    ApiKey, CredentialError, FileKeyStore, KeyManager, KeyStore, KeyUpdate, MemoryKeyStore,
};
pub use rate_limit::{RateLimitWindow, RetryAfter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
