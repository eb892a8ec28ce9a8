//! PostgreSQL adapters - Database implementations for the storage ports.
//!
//! - `PostgresInvoiceRepository` - Invoices with the one-open-invoice index
//! - `PostgresContentRepository` - Posts, tiers, and blog ownership
//! - `PostgresEntitlementStore` - Grants, follows, donations, income
//! - `PostgresReconciliationStore` - Bulk reads and overwrites for the workers

mod content_repository;
mod entitlement_store;
mod invoice_repository;
mod reconciliation_store;

pub use content_repository::PostgresContentRepository;
pub use entitlement_store::PostgresEntitlementStore;
pub use invoice_repository::PostgresInvoiceRepository;
pub use reconciliation_store::PostgresReconciliationStore;

use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt::Display;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{Amount, DomainError, ErrorCode};

/// Opens the connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::database("Failed to connect to database", e))
}

/// Applies the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database("Failed to run migrations", e))
}

/// True if `err` violated the named unique constraint.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

/// Error for a stored value the domain refuses.
pub(crate) fn corrupt(column: &str, err: impl Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, err),
    )
}

pub(crate) fn amount(column: &str, value: Decimal) -> Result<Amount, DomainError> {
    Amount::new(value).map_err(|e| corrupt(column, e))
}
