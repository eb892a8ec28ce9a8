//! Content read port: posts, tiers, and blog ownership.

use async_trait::async_trait;

use crate::domain::content::{Post, SubscriptionTier, TierLadder};
use crate::domain::foundation::{BlogId, DomainError, PostId, SubscriptionId, UserId};

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn find_post(&self, id: PostId) -> Result<Option<Post>, DomainError>;

    async fn find_tier(&self, id: SubscriptionId) -> Result<Option<SubscriptionTier>, DomainError>;

    /// Every tier of the blog, active or not, in ladder order.
    async fn tier_ladder(&self, blog_id: BlogId) -> Result<TierLadder, DomainError>;

    async fn blog_owner(&self, blog_id: BlogId) -> Result<Option<UserId>, DomainError>;

    /// Stores the minimum tier of a subscription-gated post.
    async fn assign_post_tier(&self, post_id: PostId, tier: SubscriptionId) -> Result<(), DomainError>;
}
