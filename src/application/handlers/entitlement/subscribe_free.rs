//! SubscribeFreeHandler - Binds a viewer to a blog's free tier.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, UserFollow, UserSubscription};
use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};
use crate::ports::{ContentRepository, EntitlementStore};

#[derive(Debug, Clone)]
pub struct SubscribeFreeCommand {
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
}

#[derive(Debug, Clone)]
pub struct SubscribeFreeResult {
    pub subscription: UserSubscription,
    /// False when the viewer already held a current binding on this tier.
    pub changed: bool,
}

pub struct SubscribeFreeHandler {
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn EntitlementStore>,
}

impl SubscribeFreeHandler {
    pub fn new(content: Arc<dyn ContentRepository>, store: Arc<dyn EntitlementStore>) -> Self {
        Self { content, store }
    }

    pub async fn handle(&self, cmd: SubscribeFreeCommand) -> Result<SubscribeFreeResult, EntitlementError> {
        let tier = self
            .content
            .find_tier(cmd.subscription_id)
            .await?
            .ok_or(EntitlementError::SubscriptionNotFound(cmd.subscription_id))?;
        if !tier.is_free {
            return Err(EntitlementError::NotPurchasable(format!(
                "tier {} must be paid for",
                tier.id
            )));
        }
        if !tier.is_active {
            return Err(EntitlementError::NotPurchasable(format!(
                "tier {} is no longer offered",
                tier.id
            )));
        }

        let now = Timestamp::now();
        let (subscription, changed) = match self.store.find_subscription(cmd.user_id, tier.id).await? {
            Some(mut existing) => {
                let changed = existing.subscribe_free(now)?;
                (existing, changed)
            }
            None => (
                UserSubscription::lifetime(cmd.user_id, tier.id, tier.blog_id, now),
                true,
            ),
        };

        if changed {
            self.store.save_subscription(&subscription).await?;
        }
        self.store
            .follow(&UserFollow {
                user_id: cmd.user_id,
                blog_id: tier.blog_id,
                created_at: now,
            })
            .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            blog_id = %tier.blog_id,
            tier_id = %tier.id,
            changed,
            "Free subscription"
        );

        Ok(SubscribeFreeResult {
            subscription,
            changed,
        })
    }
}
