//! Storage port for the reconciliation workers.
//!
//! Every `overwrite_*`, `expire_*`, and `mark_*` call runs as one transaction.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::content::{BlogMetrics, CommentTally, Goal, ReactionTally};
use crate::domain::entitlement::{BlogIncome, UserSubscription};
use crate::domain::foundation::{
    BlogId, DomainError, GoalId, IncomeId, PostId, Timestamp, UserSubscriptionId, WalletBatchId,
};

#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    async fn list_post_ids(&self) -> Result<Vec<PostId>, DomainError>;

    async fn overwrite_comment_counts(&self, tallies: &[CommentTally]) -> Result<u64, DomainError>;

    /// Tallies from the reaction ledger. Posts without reactions are absent.
    async fn reaction_tallies(&self) -> Result<Vec<ReactionTally>, DomainError>;

    async fn overwrite_reaction_counts(&self, tallies: &[ReactionTally]) -> Result<u64, DomainError>;

    async fn list_goals(&self) -> Result<Vec<Goal>, DomainError>;

    /// Fresh metrics for the given blogs. Blogs without data may be absent.
    async fn blog_metrics(
        &self,
        blog_ids: &[BlogId],
    ) -> Result<HashMap<BlogId, BlogMetrics>, DomainError>;

    async fn overwrite_goal_progress(&self, progress: &[(GoalId, Decimal)]) -> Result<u64, DomainError>;

    /// Active bindings whose `expires_at` is before `now`, any status.
    async fn find_lapsed_subscriptions(
        &self,
        now: Timestamp,
    ) -> Result<Vec<UserSubscription>, DomainError>;

    async fn expire_subscriptions(
        &self,
        ids: &[UserSubscriptionId],
        now: Timestamp,
    ) -> Result<u64, DomainError>;

    async fn unsent_incomes(&self) -> Result<Vec<BlogIncome>, DomainError>;

    /// Assigns `batch` to those of `ids` that are unsent and not yet in a
    /// batch. Returns how many rows were claimed.
    async fn claim_wallet_batch(
        &self,
        ids: &[IncomeId],
        batch: WalletBatchId,
    ) -> Result<u64, DomainError>;

    async fn mark_incomes_sent(&self, ids: &[IncomeId]) -> Result<u64, DomainError>;
}
