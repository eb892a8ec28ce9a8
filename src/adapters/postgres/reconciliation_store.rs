//! PostgreSQL implementation of ReconciliationStore.
//!
//! Overwrites are single `UPDATE ... FROM UNNEST(...)` statements, so each
//! tick's write is atomic.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::corrupt;
use super::entitlement_store::{IncomeRow, UserSubscriptionRow, INCOME_COLUMNS, SUBSCRIPTION_COLUMNS};
use crate::domain::content::{BlogMetrics, CommentTally, Goal, GoalType, ReactionTally};
use crate::domain::entitlement::{BlogIncome, UserSubscription};
use crate::domain::foundation::{
    BlogId, DomainError, GoalId, IncomeId, PostId, Timestamp, UserSubscriptionId, WalletBatchId,
};
use crate::ports::ReconciliationStore;

pub struct PostgresReconciliationStore {
    pool: PgPool,
}

impl PostgresReconciliationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GoalRow {
    id: Uuid,
    blog_id: Uuid,
    goal_type: i16,
    target: Decimal,
    current: Decimal,
}

impl TryFrom<GoalRow> for Goal {
    type Error = DomainError;

    fn try_from(row: GoalRow) -> Result<Self, Self::Error> {
        Ok(Goal {
            id: GoalId::from_uuid(row.id),
            blog_id: BlogId::from_uuid(row.blog_id),
            goal_type: GoalType::try_from(row.goal_type).map_err(|e| corrupt("goal_type", e))?,
            target: row.target,
            current: row.current,
        })
    }
}

fn uuids<'a, T: 'a>(ids: impl IntoIterator<Item = &'a T>, f: impl Fn(&T) -> Uuid) -> Vec<Uuid> {
    ids.into_iter().map(f).collect()
}

#[async_trait]
impl ReconciliationStore for PostgresReconciliationStore {
    async fn list_post_ids(&self) -> Result<Vec<PostId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM posts")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to list posts", e))?;
        Ok(ids.into_iter().map(PostId::from_uuid).collect())
    }

    async fn overwrite_comment_counts(&self, tallies: &[CommentTally]) -> Result<u64, DomainError> {
        let ids = uuids(tallies, |t| *t.post_id.as_uuid());
        let counts: Vec<i64> = tallies.iter().map(|t| t.comments).collect();

        let result = sqlx::query(
            r#"
            UPDATE posts p SET comments_count = t.comments
            FROM UNNEST($1::uuid[], $2::bigint[]) AS t(id, comments)
            WHERE p.id = t.id
            "#,
        )
        .bind(ids)
        .bind(counts)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to overwrite comment counts", e))?;
        Ok(result.rows_affected())
    }

    async fn reaction_tallies(&self) -> Result<Vec<ReactionTally>, DomainError> {
        let rows: Vec<(Uuid, i64, i64)> = sqlx::query_as(
            r#"
            SELECT post_id,
                   COUNT(*) FILTER (WHERE is_like),
                   COUNT(*) FILTER (WHERE NOT is_like)
            FROM post_reactions
            GROUP BY post_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to tally reactions", e))?;

        Ok(rows
            .into_iter()
            .map(|(post_id, likes, dislikes)| ReactionTally {
                post_id: PostId::from_uuid(post_id),
                likes,
                dislikes,
            })
            .collect())
    }

    async fn overwrite_reaction_counts(&self, tallies: &[ReactionTally]) -> Result<u64, DomainError> {
        let ids = uuids(tallies, |t| *t.post_id.as_uuid());
        let likes: Vec<i64> = tallies.iter().map(|t| t.likes).collect();
        let dislikes: Vec<i64> = tallies.iter().map(|t| t.dislikes).collect();

        let result = sqlx::query(
            r#"
            UPDATE posts p SET likes_count = t.likes, dislikes_count = t.dislikes
            FROM UNNEST($1::uuid[], $2::bigint[], $3::bigint[]) AS t(id, likes, dislikes)
            WHERE p.id = t.id
            "#,
        )
        .bind(ids)
        .bind(likes)
        .bind(dislikes)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to overwrite reaction counts", e))?;
        Ok(result.rows_affected())
    }

    async fn list_goals(&self) -> Result<Vec<Goal>, DomainError> {
        let rows: Vec<GoalRow> =
            sqlx::query_as("SELECT id, blog_id, goal_type, target, current FROM goals")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to list goals", e))?;
        rows.into_iter().map(Goal::try_from).collect()
    }

    async fn blog_metrics(
        &self,
        blog_ids: &[BlogId],
    ) -> Result<HashMap<BlogId, BlogMetrics>, DomainError> {
        let ids = uuids(blog_ids, |b| *b.as_uuid());
        let mut metrics: HashMap<BlogId, BlogMetrics> = HashMap::new();

        let followers: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT blog_id, COUNT(*) FROM user_follows
            WHERE blog_id = ANY($1)
            GROUP BY blog_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to count followers", e))?;
        for (blog_id, count) in followers {
            metrics.entry(BlogId::from_uuid(blog_id)).or_default().followers = count;
        }

        let paid: Vec<(Uuid, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT us.blog_id, COUNT(*), COALESCE(SUM(s.price_rub), 0)
            FROM user_subscriptions us
            JOIN subscriptions s ON s.id = us.subscription_id
            WHERE us.blog_id = ANY($1)
              AND us.is_active
              AND us.status <> 'expired'
              AND NOT s.is_free
            GROUP BY us.blog_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to sum paid subscriptions", e))?;
        for (blog_id, count, value) in paid {
            let m = metrics.entry(BlogId::from_uuid(blog_id)).or_default();
            m.paid_subscribers = count;
            m.active_subscription_value = value;
        }

        let income: Vec<(Uuid, Decimal)> = sqlx::query_as(
            r#"
            SELECT blog_id, COALESCE(SUM(amount), 0) FROM blog_incomes
            WHERE blog_id = ANY($1)
            GROUP BY blog_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to sum income", e))?;
        for (blog_id, total) in income {
            metrics.entry(BlogId::from_uuid(blog_id)).or_default().income_rub = total;
        }

        Ok(metrics)
    }

    async fn overwrite_goal_progress(&self, progress: &[(GoalId, Decimal)]) -> Result<u64, DomainError> {
        let ids = uuids(progress, |(id, _)| *id.as_uuid());
        let values: Vec<Decimal> = progress.iter().map(|(_, v)| *v).collect();

        let result = sqlx::query(
            r#"
            UPDATE goals g SET current = t.current
            FROM UNNEST($1::uuid[], $2::numeric[]) AS t(id, current)
            WHERE g.id = t.id
            "#,
        )
        .bind(ids)
        .bind(values)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to overwrite goal progress", e))?;
        Ok(result.rows_affected())
    }

    async fn find_lapsed_subscriptions(
        &self,
        now: Timestamp,
    ) -> Result<Vec<UserSubscription>, DomainError> {
        let rows: Vec<UserSubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_subscriptions WHERE is_active AND expires_at < $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find lapsed subscriptions", e))?;

        rows.into_iter().map(UserSubscription::try_from).collect()
    }

    async fn expire_subscriptions(
        &self,
        ids: &[UserSubscriptionId],
        now: Timestamp,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE user_subscriptions
            SET status = 'expired', is_active = FALSE, updated_at = $2
            WHERE id = ANY($1) AND status = 'cancelled'
            "#,
        )
        .bind(uuids(ids, |id| *id.as_uuid()))
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to expire subscriptions", e))?;
        Ok(result.rows_affected())
    }

    async fn unsent_incomes(&self) -> Result<Vec<BlogIncome>, DomainError> {
        let rows: Vec<IncomeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM blog_incomes WHERE NOT sent_to_user_wallet ORDER BY created_at",
            INCOME_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load unsent income", e))?;

        rows.into_iter().map(BlogIncome::try_from).collect()
    }

    async fn claim_wallet_batch(
        &self,
        ids: &[IncomeId],
        batch: WalletBatchId,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_incomes SET wallet_batch = $2
            WHERE id = ANY($1) AND wallet_batch IS NULL AND NOT sent_to_user_wallet
            "#,
        )
        .bind(uuids(ids, |id| *id.as_uuid()))
        .bind(batch.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to claim wallet batch", e))?;
        Ok(result.rows_affected())
    }

    async fn mark_incomes_sent(&self, ids: &[IncomeId]) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_incomes SET sent_to_user_wallet = TRUE
            WHERE id = ANY($1) AND NOT sent_to_user_wallet
            "#,
        )
        .bind(uuids(ids, |id| *id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to mark income sent", e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_row_converts() {
        let row = GoalRow {
            id: Uuid::new_v4(),
            blog_id: Uuid::new_v4(),
            goal_type: 3,
            target: Decimal::from(10_000),
            current: Decimal::from(12_500),
        };
        let goal = Goal::try_from(row).unwrap();
        assert_eq!(goal.goal_type, GoalType::IncomeRub);
        assert!(goal.is_reached());
    }

    #[test]
    fn unknown_goal_type_is_rejected() {
        let row = GoalRow {
            id: Uuid::new_v4(),
            blog_id: Uuid::new_v4(),
            goal_type: 0,
            target: Decimal::ONE,
            current: Decimal::ZERO,
        };
        assert!(Goal::try_from(row).is_err());
    }
}
