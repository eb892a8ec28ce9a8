//! PostgreSQL implementation of EntitlementStore.
//!
//! Each `record_*` call is one transaction. A repeated grant for the same
//! invoice hits `blog_incomes_one_per_invoice` and rolls back as `Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{amount, corrupt, violates};
use crate::domain::billing::ItemType;
use crate::domain::entitlement::{
    BlogIncome, Donation, DonationStatus, SubscriptionStatus, UserFollow, UserSubscription,
};
use crate::domain::foundation::{
    BlogId, Currency, DomainError, DonationId, ErrorCode, IncomeId, InvoiceId, PostId,
    SubscriptionId, Timestamp, UserId, UserSubscriptionId, WalletBatchId,
};
use crate::ports::{EntitlementStore, PostPurchase, SubscriptionGrant};

const ONE_INCOME_PER_INVOICE: &str = "blog_incomes_one_per_invoice";

pub(super) const INCOME_COLUMNS: &str = "id, blog_id, owner_id, payer_id, amount, currency, \
                                         source, item_id, invoice_id, sent_to_user_wallet, wallet_batch, \
                                         created_at";

pub(super) const SUBSCRIPTION_COLUMNS: &str = "id, user_id, subscription_id, blog_id, status, \
                                               is_active, expires_at, created_at, updated_at";

pub struct PostgresEntitlementStore {
    pool: PgPool,
}

impl PostgresEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rows
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
pub(super) struct IncomeRow {
    id: Uuid,
    blog_id: Uuid,
    owner_id: Uuid,
    payer_id: Uuid,
    amount: Decimal,
    currency: String,
    source: String,
    item_id: Uuid,
    invoice_id: Option<i64>,
    sent_to_user_wallet: bool,
    wallet_batch: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<IncomeRow> for BlogIncome {
    type Error = DomainError;

    fn try_from(row: IncomeRow) -> Result<Self, Self::Error> {
        Ok(BlogIncome {
            id: IncomeId::from_uuid(row.id),
            blog_id: BlogId::from_uuid(row.blog_id),
            owner_id: UserId::from_uuid(row.owner_id),
            payer_id: UserId::from_uuid(row.payer_id),
            amount: amount("amount", row.amount)?,
            currency: row
                .currency
                .parse::<Currency>()
                .map_err(|e| corrupt("currency", e))?,
            source: row
                .source
                .parse::<ItemType>()
                .map_err(|e| corrupt("source", e))?,
            item_id: row.item_id,
            invoice_id: row.invoice_id.map(InvoiceId::new),
            sent_to_user_wallet: row.sent_to_user_wallet,
            wallet_batch: row.wallet_batch.map(WalletBatchId::from_uuid),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserSubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    subscription_id: Uuid,
    blog_id: Uuid,
    status: String,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserSubscriptionRow> for UserSubscription {
    type Error = DomainError;

    fn try_from(row: UserSubscriptionRow) -> Result<Self, Self::Error> {
        Ok(UserSubscription {
            id: UserSubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            blog_id: BlogId::from_uuid(row.blog_id),
            status: row
                .status
                .parse::<SubscriptionStatus>()
                .map_err(|e| corrupt("status", e))?,
            is_active: row.is_active,
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: Uuid,
    blog_id: Uuid,
    donor_id: Uuid,
    amount: Decimal,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DonationRow> for Donation {
    type Error = DomainError;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        Ok(Donation {
            id: DonationId::from_uuid(row.id),
            blog_id: BlogId::from_uuid(row.blog_id),
            donor_id: UserId::from_uuid(row.donor_id),
            amount: amount("amount", row.amount)?,
            message: row.message,
            status: row
                .status
                .parse::<DonationStatus>()
                .map_err(|e| corrupt("status", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Statements shared by the grant transactions
// ════════════════════════════════════════════════════════════════════════════

async fn insert_income(conn: &mut PgConnection, income: &BlogIncome) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO blog_incomes (
            id, blog_id, owner_id, payer_id, amount, currency, source, item_id,
            invoice_id, sent_to_user_wallet, wallet_batch, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(income.id.as_uuid())
    .bind(income.blog_id.as_uuid())
    .bind(income.owner_id.as_uuid())
    .bind(income.payer_id.as_uuid())
    .bind(income.amount.as_decimal())
    .bind(income.currency.as_str())
    .bind(income.source.as_str())
    .bind(income.item_id)
    .bind(income.invoice_id.map(|id| id.value()))
    .bind(income.sent_to_user_wallet)
    .bind(income.wallet_batch.map(|b| *b.as_uuid()))
    .bind(income.created_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| {
        if violates(&e, ONE_INCOME_PER_INVOICE) {
            return DomainError::new(ErrorCode::Conflict, "income already recorded for invoice");
        }
        DomainError::database("Failed to record income", e)
    })?;
    Ok(())
}

async fn upsert_subscription(
    conn: &mut PgConnection,
    subscription: &UserSubscription,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO user_subscriptions (
            id, user_id, subscription_id, blog_id, status, is_active,
            expires_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (user_id, subscription_id) DO UPDATE SET
            status = EXCLUDED.status,
            is_active = EXCLUDED.is_active,
            expires_at = EXCLUDED.expires_at,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(subscription.id.as_uuid())
    .bind(subscription.user_id.as_uuid())
    .bind(subscription.subscription_id.as_uuid())
    .bind(subscription.blog_id.as_uuid())
    .bind(subscription.status.as_str())
    .bind(subscription.is_active)
    .bind(subscription.expires_at.map(|t| *t.as_datetime()))
    .bind(subscription.created_at.as_datetime())
    .bind(subscription.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| DomainError::database("Failed to save subscription", e))?;
    Ok(())
}

async fn upsert_follow(conn: &mut PgConnection, follow: &UserFollow) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO user_follows (user_id, blog_id, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, blog_id) DO UPDATE SET created_at = EXCLUDED.created_at
        "#,
    )
    .bind(follow.user_id.as_uuid())
    .bind(follow.blog_id.as_uuid())
    .bind(follow.created_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| DomainError::database("Failed to save follow", e))?;
    Ok(())
}

#[async_trait]
impl EntitlementStore for PostgresEntitlementStore {
    async fn find_income_by_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<BlogIncome>, DomainError> {
        let row: Option<IncomeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM blog_incomes WHERE invoice_id = $1",
            INCOME_COLUMNS
        ))
        .bind(invoice_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find income", e))?;

        row.map(BlogIncome::try_from).transpose()
    }

    async fn find_subscription(
        &self,
        user_id: UserId,
        tier_id: SubscriptionId,
    ) -> Result<Option<UserSubscription>, DomainError> {
        let row: Option<UserSubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_subscriptions WHERE user_id = $1 AND subscription_id = $2",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(tier_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find subscription", e))?;

        row.map(UserSubscription::try_from).transpose()
    }

    async fn list_subscriptions(
        &self,
        user_id: UserId,
        blog_id: BlogId,
    ) -> Result<Vec<UserSubscription>, DomainError> {
        let rows: Vec<UserSubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_subscriptions WHERE user_id = $1 AND blog_id = $2",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(blog_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list subscriptions", e))?;

        rows.into_iter().map(UserSubscription::try_from).collect()
    }

    async fn save_subscription(&self, subscription: &UserSubscription) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DomainError::database("Failed to acquire connection", e))?;
        upsert_subscription(&mut conn, subscription).await
    }

    async fn record_subscription_grant(&self, grant: &SubscriptionGrant) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        insert_income(&mut tx, &grant.income).await?;
        upsert_follow(&mut tx, &grant.follow).await?;
        upsert_subscription(&mut tx, &grant.subscription).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit subscription grant", e))
    }

    async fn has_paid_access(&self, post_id: PostId, user_id: UserId) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM post_paid_access WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to check paid access", e))
    }

    async fn record_post_purchase(&self, purchase: &PostPurchase) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        insert_income(&mut tx, &purchase.income).await?;
        if let Some(access) = &purchase.access {
            sqlx::query(
                r#"
                INSERT INTO post_paid_access (post_id, user_id, created_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (post_id, user_id) DO NOTHING
                "#,
            )
            .bind(access.post_id.as_uuid())
            .bind(access.user_id.as_uuid())
            .bind(access.created_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to grant post access", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit post purchase", e))
    }

    async fn find_donation(&self, id: DonationId) -> Result<Option<Donation>, DomainError> {
        let row: Option<DonationRow> = sqlx::query_as(
            r#"
            SELECT id, blog_id, donor_id, amount, message, status, created_at
            FROM donations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find donation", e))?;

        row.map(Donation::try_from).transpose()
    }

    async fn record_donation(&self, income: &BlogIncome, donation: &Donation) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        insert_income(&mut tx, income).await?;
        let result = sqlx::query("UPDATE donations SET status = $2 WHERE id = $1")
            .bind(donation.id.as_uuid())
            .bind(donation.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to confirm donation", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::DonationNotFound,
                format!("donation {}", donation.id),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit donation", e))
    }

    async fn is_following(&self, user_id: UserId, blog_id: BlogId) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_follows WHERE user_id = $1 AND blog_id = $2)",
        )
        .bind(user_id.as_uuid())
        .bind(blog_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to check follow", e))
    }

    async fn follow(&self, follow: &UserFollow) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DomainError::database("Failed to acquire connection", e))?;
        upsert_follow(&mut conn, follow).await
    }

    async fn unfollow(&self, user_id: UserId, blog_id: BlogId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM user_follows WHERE user_id = $1 AND blog_id = $2")
            .bind(user_id.as_uuid())
            .bind(blog_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to unfollow", e))?;
        Ok(result.rows_affected() > 0)
    }
}
