//! PostgreSQL implementation of ContentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{amount, corrupt};
use crate::domain::content::{AccessMode, Post, SubscriptionTier, TierLadder};
use crate::domain::foundation::{
    BlogId, DomainError, ErrorCode, PostId, SubscriptionId, Timestamp, UserId,
};
use crate::ports::ContentRepository;

const TIER_COLUMNS: &str = "id, blog_id, title, is_free, price_rub, is_active, cover";

pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    blog_id: Uuid,
    author_id: Uuid,
    access_mode: i16,
    price: Option<Decimal>,
    subscription_id: Option<Uuid>,
    likes_count: i64,
    dislikes_count: i64,
    comments_count: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = DomainError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: PostId::from_uuid(row.id),
            blog_id: BlogId::from_uuid(row.blog_id),
            author_id: UserId::from_uuid(row.author_id),
            access_mode: AccessMode::try_from(row.access_mode)
                .map_err(|e| corrupt("access_mode", e))?,
            price: row.price.map(|p| amount("price", p)).transpose()?,
            subscription_id: row.subscription_id.map(SubscriptionId::from_uuid),
            likes_count: row.likes_count,
            dislikes_count: row.dislikes_count,
            comments_count: row.comments_count,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TierRow {
    id: Uuid,
    blog_id: Uuid,
    title: String,
    is_free: bool,
    price_rub: Decimal,
    is_active: bool,
    cover: Option<String>,
}

impl TryFrom<TierRow> for SubscriptionTier {
    type Error = DomainError;

    fn try_from(row: TierRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionTier {
            id: SubscriptionId::from_uuid(row.id),
            blog_id: BlogId::from_uuid(row.blog_id),
            title: row.title,
            is_free: row.is_free,
            price_rub: amount("price_rub", row.price_rub)?,
            is_active: row.is_active,
            cover: row.cover,
        })
    }
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn find_post(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        let row: Option<PostRow> = sqlx::query_as(
            r#"
            SELECT id, blog_id, author_id, access_mode, price, subscription_id,
                   likes_count, dislikes_count, comments_count, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find post", e))?;

        row.map(Post::try_from).transpose()
    }

    async fn find_tier(&self, id: SubscriptionId) -> Result<Option<SubscriptionTier>, DomainError> {
        let row: Option<TierRow> =
            sqlx::query_as(&format!("SELECT {} FROM subscriptions WHERE id = $1", TIER_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to find tier", e))?;

        row.map(SubscriptionTier::try_from).transpose()
    }

    async fn tier_ladder(&self, blog_id: BlogId) -> Result<TierLadder, DomainError> {
        let rows: Vec<TierRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE blog_id = $1 ORDER BY price_rub ASC, id ASC",
            TIER_COLUMNS
        ))
        .bind(blog_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load tiers", e))?;

        let tiers = rows
            .into_iter()
            .map(SubscriptionTier::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TierLadder::new(tiers))
    }

    async fn blog_owner(&self, blog_id: BlogId) -> Result<Option<UserId>, DomainError> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT owner_id FROM blogs WHERE id = $1")
            .bind(blog_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to find blog owner", e))?;

        Ok(owner.map(UserId::from_uuid))
    }

    async fn assign_post_tier(&self, post_id: PostId, tier: SubscriptionId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE posts SET subscription_id = $2 WHERE id = $1")
            .bind(post_id.as_uuid())
            .bind(tier.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to assign post tier", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PostNotFound,
                format!("post {}", post_id),
            ));
        }
        Ok(())
    }
}
