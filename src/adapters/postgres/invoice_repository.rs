//! PostgreSQL implementation of InvoiceRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{amount, corrupt, violates};
use crate::domain::billing::{Invoice, InvoiceStatus, ItemType, NewInvoice};
use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, Timestamp, UserId};
use crate::ports::InvoiceRepository;

const ONE_NEW_PER_ITEM: &str = "invoices_one_new_per_item";

const COLUMNS: &str = "id, out_sum, item_id, item_type, user_id, description, expires_at, \
                       status, payment_link, created_at, updated_at";

pub struct PostgresInvoiceRepository {
    pool: PgPool,
}

impl PostgresInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    out_sum: Decimal,
    item_id: Uuid,
    item_type: String,
    user_id: Uuid,
    description: String,
    expires_at: DateTime<Utc>,
    status: String,
    payment_link: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DomainError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: InvoiceId::new(row.id),
            out_sum: amount("out_sum", row.out_sum)?,
            item_id: row.item_id,
            item_type: row
                .item_type
                .parse::<ItemType>()
                .map_err(|e| corrupt("item_type", e))?,
            user_id: UserId::from_uuid(row.user_id),
            description: row.description,
            expires_at: Timestamp::from_datetime(row.expires_at),
            status: row
                .status
                .parse::<InvoiceStatus>()
                .map_err(|e| corrupt("status", e))?,
            payment_link: row.payment_link,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
    async fn create(&self, draft: &NewInvoice) -> Result<Invoice, DomainError> {
        let now = Timestamp::now();
        let row: InvoiceRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO invoices (
                out_sum, item_id, item_type, user_id, description, expires_at,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, 'new', $7, $7)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(draft.out_sum.as_decimal())
        .bind(draft.item_id)
        .bind(draft.item_type.as_str())
        .bind(draft.user_id.as_uuid())
        .bind(&draft.description)
        .bind(draft.expires_at.as_datetime())
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, ONE_NEW_PER_ITEM) {
                return DomainError::new(
                    ErrorCode::Conflict,
                    "an open invoice already exists for this item",
                );
            }
            DomainError::database("Failed to create invoice", e)
        })?;

        Invoice::try_from(row)
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                status = $2,
                payment_link = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(invoice.id.value())
        .bind(invoice.status.as_str())
        .bind(&invoice.payment_link)
        .bind(invoice.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, ONE_NEW_PER_ITEM) {
                return DomainError::new(ErrorCode::Conflict, "another open invoice exists");
            }
            DomainError::database("Failed to update invoice", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::InvoiceNotFound,
                format!("invoice {}", invoice.id),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, DomainError> {
        let row: Option<InvoiceRow> =
            sqlx::query_as(&format!("SELECT {} FROM invoices WHERE id = $1", COLUMNS))
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to find invoice", e))?;

        row.map(Invoice::try_from).transpose()
    }

    async fn find_latest_for(
        &self,
        user_id: UserId,
        item_id: Uuid,
    ) -> Result<Option<Invoice>, DomainError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM invoices
            WHERE user_id = $1 AND item_id = $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find latest invoice", e))?;

        row.map(Invoice::try_from).transpose()
    }
}
