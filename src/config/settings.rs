use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::config::env::{self, EnvKey};
use crate::infrastructure::db::pool::{DatabaseConfig, Dialect};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct S3Config {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub local_storage_path: PathBuf,
    pub input_bucket: String,
    pub s3: S3Config,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_vars(env::get)
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// When `APP_ENV=test` the `*_TEST` database settings are used, falling
    /// back to an in-memory SQLite database.
    pub fn from_vars<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(EnvKey) -> Option<String>,
    {
        let required = |key: EnvKey| {
            let name = key.as_str();
            get(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let flag = |key: EnvKey| -> Result<bool, ConfigError> {
            let name = key.as_str();
            match get(key) {
                None => Ok(false),
                Some(v) => v.parse::<bool>().map_err(|_| ConfigError::Invalid {
                    key: name,
                    value: v,
                }),
            }
        };

        let server_port = match get(EnvKey::ServerPort) {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: EnvKey::ServerPort.as_str(),
                value: v,
            })?,
            None => 3000,
        };

        let is_test = get(EnvKey::AppEnv).as_deref() == Some("test");
        let (dialect_key, dialect, dsn) = if is_test {
            (
                EnvKey::DbTypeTest.as_str(),
                get(EnvKey::DbTypeTest).unwrap_or_else(|| "sqlite3".to_string()),
                get(EnvKey::DatabaseUrlTest).unwrap_or_else(|| "sqlite::memory:".to_string()),
            )
        } else {
            (
                EnvKey::DbType.as_str(),
                required(EnvKey::DbType)?,
                required(EnvKey::DatabaseUrl)?,
            )
        };
        let dialect = Dialect::from_str(&dialect).map_err(|_| ConfigError::Invalid {
            key: dialect_key,
            value: dialect,
        })?;

        let database = DatabaseConfig {
            dialect,
            dsn,
            debug: flag(EnvKey::DbDebug)?,
            auto_migrate: is_test || flag(EnvKey::AutoMigrateDb)?,
        };

        Ok(Self {
            server_port,
            database,
            local_storage_path: get(EnvKey::LocalStoragePath)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp")),
            input_bucket: required(EnvKey::InputBucket)?,
            s3: S3Config {
                endpoint: get(EnvKey::S3Endpoint).filter(|v| !v.is_empty()),
                region: get(EnvKey::S3Region).unwrap_or_else(|| "us-east-1".to_string()),
                access_key: required(EnvKey::S3AccessKey)?,
                secret_key: required(EnvKey::S3SecretKey)?,
            },
        })
    }
}
