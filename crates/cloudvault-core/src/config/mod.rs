//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod logging;
pub mod share;
pub mod storage;
pub mod transfer;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::share::ShareConfig;
pub use self::storage::{S3StorageConfig, StorageConfig};
pub use self::transfer::TransferConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// (default.toml + environment overlay + `CLOUDVAULT__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token and identity settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Object store settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Client-side transfer tuning.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Share link defaults.
    #[serde(default)]
    pub share: ShareConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which metadata store implementation backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    /// PostgreSQL through sqlx.
    Postgres,
    /// Process-local maps, for development and tests.
    Memory,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Store implementation to use.
    #[serde(default = "default_backend")]
    pub backend: MetadataBackend,
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml`, and environment
    /// variables such as `CLOUDVAULT__SERVER__PORT=9000`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CLOUDVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.backend == MetadataBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.backend = \"postgres\"",
            ));
        }
        self.transfer.validate()?;
        if self.share.default_download_limit <= 0 {
            return Err(AppError::configuration(
                "share.default_download_limit must be positive",
            ));
        }
        Ok(())
    }
}

fn default_backend() -> MetadataBackend {
    MetadataBackend::Postgres
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let config = AppConfig::default();
        assert_eq!(config.transfer.multipart_threshold_bytes, 100 * 1024 * 1024);
        assert_eq!(config.transfer.part_size_bytes, 20 * 1024 * 1024);
        assert_eq!(config.transfer.concurrency, 3);
        assert_eq!(config.share.default_download_limit, 3);
        assert_eq!(config.auth.magic_link_ttl_minutes, 15);
        assert_eq!(config.auth.share_session_ttl_hours, 24);
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let mut memory = AppConfig::default();
        memory.database.backend = MetadataBackend::Memory;
        assert!(memory.validate().is_ok());
    }
}
