//! Commerce engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLOUDBERRY_DATABASE_URL` - `SQLite` connection string
//!   (e.g. `sqlite://cloudberry.db` or `sqlite::memory:`)
//!
//! ## Optional
//! - `CLOUDBERRY_DB_MAX_CONNECTIONS` - Pool size (default: 10)

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Commerce engine configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Database connection URL (may embed credentials)
    pub database_url: SecretString,
    /// Maximum number of pooled connections
    pub max_connections: u32,
}

impl CommerceConfig {
    /// Load configuration from the environment, reading a `.env` file first
    /// if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from already-set environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require_env("CLOUDBERRY_DATABASE_URL")?;

        let max_connections = match std::env::var("CLOUDBERRY_DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    "CLOUDBERRY_DB_MAX_CONNECTIONS".to_owned(),
                    format!("not a valid pool size: {raw}"),
                )
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: SecretString::from(database_url),
            max_connections,
        })
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}
