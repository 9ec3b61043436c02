//! Configuration for Users API

use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;
use std::path::PathBuf;
use std::str::FromStr;

pub use core_config::Environment;

/// Which `UserRepository` backs the service
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
    Postgres,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "postgres" => Ok(Self::Postgres),
            other => Err(ConfigError::ParseError {
                key: "USER_STORE".to_string(),
                details: format!("unknown store '{other}', expected memory, file or postgres"),
            }),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub store: StoreKind,
    /// Document path for the file store
    pub users_file: PathBuf,
    /// Present only when `store` is [`StoreKind::Postgres`]
    pub postgres: Option<PostgresConfig>,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let store: StoreKind = env_or_default("USER_STORE", "memory").parse()?;
        let users_file = PathBuf::from(env_or_default("USERS_FILE", "users.json"));

        let postgres = match store {
            StoreKind::Postgres => Some(PostgresConfig::from_env()?),
            StoreKind::Memory | StoreKind::File => None,
        };

        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            store,
            users_file,
            postgres,
            jwt,
        })
    }
}
