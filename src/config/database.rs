//! PostgreSQL pool settings.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const POOL_CEILING: u32 = 100;

/// Pool sizing for the request handlers and the workers' bulk updates,
/// which share one pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Apply the embedded `migrations/` before serving.
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let scheme = self.url.split_once("://").map(|(scheme, _)| scheme);
        match scheme {
            _ if self.url.trim().is_empty() => {
                return Err(ValidationError::MissingRequired("DATABASE__URL"))
            }
            Some("postgres") | Some("postgresql") => {}
            _ => return Err(ValidationError::InvalidDatabaseUrl),
        }
        if self.max_connections > POOL_CEILING {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 2,
            max_connections: 16,
            acquire_timeout_secs: 10,
            run_migrations: false,
        }
    }
}
