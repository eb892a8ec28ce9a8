//! Entitlement handlers.
//!
//! The three grant handlers are the callee side of the payment pipeline and
//! are idempotent per invoice: a request whose `invoice_id` already produced
//! income is acknowledged without writing anything.

mod confirm_donation;
mod follow;
mod grant_post_access;
mod grant_subscription;
mod local_granter;
mod subscribe_free;

pub use confirm_donation::ConfirmDonationHandler;
pub use follow::{FollowCommand, FollowHandler, UnfollowHandler};
pub use grant_post_access::GrantPostAccessHandler;
pub use grant_subscription::GrantSubscriptionHandler;
pub use local_granter::LocalEntitlementGranter;
pub use subscribe_free::{SubscribeFreeCommand, SubscribeFreeHandler, SubscribeFreeResult};

use crate::domain::entitlement::{EntitlementError, GrantRequest};
use crate::domain::foundation::{BlogId, UserId};
use crate::ports::{ContentRepository, EntitlementStore};

/// True when the request's invoice already produced income.
async fn already_granted(
    store: &dyn EntitlementStore,
    request: &GrantRequest,
) -> Result<bool, EntitlementError> {
    let Some(invoice_id) = request.invoice_id else {
        return Ok(false);
    };
    let existing = store.find_income_by_invoice(invoice_id).await?;
    if existing.is_some() {
        tracing::info!(%invoice_id, item_id = %request.item_id, "Grant already applied");
    }
    Ok(existing.is_some())
}

async fn blog_owner(content: &dyn ContentRepository, blog_id: BlogId) -> Result<UserId, EntitlementError> {
    content
        .blog_owner(blog_id)
        .await?
        .ok_or_else(|| EntitlementError::Infrastructure(format!("blog {} has no owner", blog_id)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::adapters::memory::{InMemoryDatabase, RecordingNotifications};
    use crate::domain::content::{AccessMode, Post, SubscriptionTier};
    use crate::domain::entitlement::GrantRequest;
    use crate::domain::foundation::{
        BlogId, Currency, InvoiceId, PostId, SubscriptionId, Timestamp, UserId,
    };
    use crate::ports::EntitlementStore;

    /// One blog with an owner, backed by the in-memory database.
    pub struct World {
        pub db: Arc<InMemoryDatabase>,
        pub notifications: Arc<RecordingNotifications>,
        pub blog: BlogId,
        pub owner: UserId,
    }

    impl World {
        pub fn new() -> Self {
            let db = Arc::new(InMemoryDatabase::new());
            let (blog, owner) = (BlogId::new(), UserId::new());
            db.insert_blog(blog, owner);
            Self {
                db,
                notifications: Arc::new(RecordingNotifications::new()),
                blog,
                owner,
            }
        }

        pub fn tier(&self, price: &str, is_free: bool) -> SubscriptionTier {
            let tier = SubscriptionTier {
                id: SubscriptionId::new(),
                blog_id: self.blog,
                title: format!("Tier {}", price),
                is_free,
                price_rub: price.parse().unwrap(),
                is_active: true,
                cover: None,
            };
            self.db.insert_tier(tier.clone());
            tier
        }

        pub fn post(&self, access_mode: AccessMode, tier: Option<SubscriptionId>) -> Post {
            let post = Post {
                id: PostId::new(),
                blog_id: self.blog,
                author_id: self.owner,
                access_mode,
                price: None,
                subscription_id: tier,
                likes_count: 0,
                dislikes_count: 0,
                comments_count: 0,
                created_at: Timestamp::now(),
            };
            self.db.insert_post(post.clone());
            post
        }

        pub async fn is_following(&self, user: UserId) -> bool {
            self.db.is_following(user, self.blog).await.unwrap()
        }
    }

    pub fn grant(item_id: &Uuid, user_id: UserId, value: &str, invoice: Option<i64>) -> GrantRequest {
        GrantRequest {
            item_id: *item_id,
            user_id,
            value: value.parse().unwrap(),
            currency: Currency::Rub,
            invoice_id: invoice.map(InvoiceId::new),
        }
    }
}
