//! Server configuration loaded from the environment

use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://tasks.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";

/// Database URL value that selects the in-memory store
pub const MEMORY_STORE: &str = "memory";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Where the task lists are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { url: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Read `TASKS_DATABASE_URL` and `TASKS_BIND_ADDR`, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("TASKS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "TASKS_BIND_ADDR",
                message: format!("{bind_addr}: {e}"),
            })?;

        let database_url = lookup("TASKS_DATABASE_URL")
            .map(|url| url.trim().to_string())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let store = if database_url == MEMORY_STORE {
            StoreConfig::Memory
        } else if database_url.starts_with("sqlite:") {
            StoreConfig::Sqlite { url: database_url }
        } else {
            return Err(ConfigError::InvalidValue {
                key: "TASKS_DATABASE_URL",
                message: format!("expected a sqlite: URL or `{MEMORY_STORE}`, got {database_url}"),
            });
        };

        Ok(Self { bind_addr, store })
    }
}
