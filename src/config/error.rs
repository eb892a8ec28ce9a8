//! Startup configuration failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingRequired(&'static str),

    #[error("'{0}' is not an IP address")]
    InvalidAddress(String),

    #[error("port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be 1..=300 seconds")]
    InvalidTimeout,

    #[error("database URL must use postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("redis URL must use redis://, rediss:// or redis+unix://")]
    InvalidRedisUrl,

    #[error("pool needs 1..=max_connections connections with min <= max")]
    InvalidPoolSize,

    #[error("max_connections may not exceed 100")]
    PoolSizeTooLarge,

    #[error("{0} service URL must be an absolute http(s) URL")]
    InvalidServiceUrl(&'static str),

    #[error("payment link prefix must be an absolute http(s) URL")]
    InvalidPaymentLinkPrefix,

    #[error("invoice TTL must be between 60 seconds and 7 days")]
    InvalidInvoiceTtl,

    #[error("{0} interval must be at least one second")]
    InvalidWorkerInterval(&'static str),

    #[error("price limits are inconsistent")]
    InvalidPriceLimits,
}
