//! Entitlement persistence port.
//!
//! The `record_*` methods write every row of one grant in a single
//! transaction, so a failed grant leaves nothing behind and the gateway's
//! redelivery starts from a clean slate.

use async_trait::async_trait;

use crate::domain::entitlement::{
    BlogIncome, Donation, PostPaidAccess, UserFollow, UserSubscription,
};
use crate::domain::foundation::{
    BlogId, DomainError, DonationId, InvoiceId, PostId, SubscriptionId, UserId,
};

/// Rows written by a paid subscription grant.
#[derive(Debug, Clone)]
pub struct SubscriptionGrant {
    pub income: BlogIncome,
    pub follow: UserFollow,
    /// Inserted or updated by `(user, tier)`.
    pub subscription: UserSubscription,
}

/// Rows written by a post purchase.
#[derive(Debug, Clone)]
pub struct PostPurchase {
    pub income: BlogIncome,
    /// `None` when the buyer already had access.
    pub access: Option<PostPaidAccess>,
}

#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Income produced by an invoice, used to detect repeated grants.
    async fn find_income_by_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<BlogIncome>, DomainError>;

    /// The viewer's binding on one tier.
    async fn find_subscription(
        &self,
        user_id: UserId,
        tier_id: SubscriptionId,
    ) -> Result<Option<UserSubscription>, DomainError>;

    /// Every binding the viewer holds on a blog, current or not.
    async fn list_subscriptions(
        &self,
        user_id: UserId,
        blog_id: BlogId,
    ) -> Result<Vec<UserSubscription>, DomainError>;

    /// Inserts or updates the binding for its `(user, tier)`.
    async fn save_subscription(&self, subscription: &UserSubscription) -> Result<(), DomainError>;

    async fn record_subscription_grant(&self, grant: &SubscriptionGrant) -> Result<(), DomainError>;

    async fn has_paid_access(&self, post_id: PostId, user_id: UserId) -> Result<bool, DomainError>;

    async fn record_post_purchase(&self, purchase: &PostPurchase) -> Result<(), DomainError>;

    async fn find_donation(&self, id: DonationId) -> Result<Option<Donation>, DomainError>;

    async fn record_donation(&self, income: &BlogIncome, donation: &Donation) -> Result<(), DomainError>;

    async fn is_following(&self, user_id: UserId, blog_id: BlogId) -> Result<bool, DomainError>;

    /// Creates the follow or refreshes its timestamp.
    async fn follow(&self, follow: &UserFollow) -> Result<(), DomainError>;

    /// Returns `false` if there was nothing to remove.
    async fn unfollow(&self, user_id: UserId, blog_id: BlogId) -> Result<bool, DomainError>;
}
