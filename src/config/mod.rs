//! Startup configuration.
//!
//! Read once from `PATRONAGE__*` environment variables, after `.env` is
//! loaded by `dotenvy`. Nested keys use `__`, so `PATRONAGE__DATABASE__URL`
//! fills `database.url`.
//!
//! Scalars that may change without a restart (price limits, test mode) are
//! only seeded from here; afterwards they live in [`SettingsStore`].
//!
//! ```no_run
//! use patronage::config::AppConfig;
//!
//! # fn main() -> Result<(), patronage::config::ConfigError> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

mod database;
mod error;
mod limits;
mod payment;
mod redis;
mod runtime;
mod server;
mod services;
mod workers;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use limits::LimitsConfig;
pub use payment::PaymentConfig;
pub use redis::RedisConfig;
pub use runtime::{spawn_settings_writer, RuntimeSettings, SettingsStore, SettingsUpdate};
pub use server::{Environment, ServerConfig};
pub use services::ServicesConfig;
pub use workers::WorkersConfig;

use serde::Deserialize;
use std::collections::HashMap;

const ENV_PREFIX: &str = "PATRONAGE";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Absent means static settings and log-only notifications.
    pub redis: Option<RedisConfig>,
    pub payment: PaymentConfig,
    pub services: ServicesConfig,
    #[serde(default)]
    pub workers: WorkersConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Ignoring unreadable .env file");
            }
        }
        Self::from_source(None)
    }

    /// Builds the config from `vars` instead of the process environment when given.
    fn from_source(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(vars);
        Ok(config::Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.as_ref().map_or(Ok(()), RedisConfig::validate)?;
        self.payment.validate()?;
        self.services.validate()?;
        self.workers.validate()?;
        self.limits.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
