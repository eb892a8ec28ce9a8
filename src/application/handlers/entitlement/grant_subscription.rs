//! GrantSubscriptionHandler - Materializes a paid tier purchase.
//!
//! Writes, in one transaction: the blog income, the follow, and the viewer's
//! binding on the bought tier extended for a fresh 720 hour period. Bindings
//! on the blog's other tiers are left as they are.

use std::sync::Arc;

use crate::domain::billing::ItemType;
use crate::domain::entitlement::{
    BlogIncome, EntitlementError, GrantOutcome, GrantRequest, Notification, NotificationEvent,
    UserFollow, UserSubscription,
};
use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::ports::{ContentRepository, EntitlementStore, NotificationSink, SubscriptionGrant};

use super::{already_granted, blog_owner};

pub struct GrantSubscriptionHandler {
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn EntitlementStore>,
    notifications: Arc<dyn NotificationSink>,
}

impl GrantSubscriptionHandler {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        store: Arc<dyn EntitlementStore>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            content,
            store,
            notifications,
        }
    }

    pub async fn handle(&self, request: &GrantRequest) -> Result<GrantOutcome, EntitlementError> {
        if already_granted(&*self.store, request).await? {
            return Ok(GrantOutcome::AlreadyGranted);
        }

        let tier_id = SubscriptionId::from_uuid(request.item_id);
        let tier = self
            .content
            .find_tier(tier_id)
            .await?
            .ok_or(EntitlementError::SubscriptionNotFound(tier_id))?;
        if tier.is_free {
            return Err(EntitlementError::NotPurchasable(format!(
                "tier {} is free",
                tier.id
            )));
        }
        let owner_id = blog_owner(&*self.content, tier.blog_id).await?;

        let now = Timestamp::now();
        let subscription = match self.store.find_subscription(request.user_id, tier.id).await? {
            Some(mut existing) => {
                existing.renew_paid(now)?;
                existing
            }
            None => UserSubscription::paid(request.user_id, tier.id, tier.blog_id, now),
        };

        let grant = SubscriptionGrant {
            income: BlogIncome::record(
                tier.blog_id,
                owner_id,
                request.user_id,
                request.value,
                request.currency,
                ItemType::Subscription,
                request.item_id,
                request.invoice_id,
                now,
            ),
            follow: UserFollow {
                user_id: request.user_id,
                blog_id: tier.blog_id,
                created_at: now,
            },
            subscription,
        };

        match self.store.record_subscription_grant(&grant).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => return Ok(GrantOutcome::AlreadyGranted),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            user_id = %request.user_id,
            blog_id = %tier.blog_id,
            tier_id = %tier.id,
            expires_at = ?grant.subscription.expires_at,
            "Subscription granted"
        );

        self.notifications.push(Notification::new(
            owner_id,
            NotificationEvent::NewSubscriber {
                blog_id: tier.blog_id,
                subscription_id: tier.id,
                subscriber_id: request.user_id,
            },
        ));
        self.notifications.push(Notification::new(
            request.user_id,
            NotificationEvent::SubscriptionActivated {
                blog_id: tier.blog_id,
                subscription_id: tier.id,
            },
        ));

        Ok(GrantOutcome::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::domain::entitlement::{SubscriptionStatus, PAID_PERIOD_HOURS};
    use crate::domain::foundation::{InvoiceId, UserId};

    fn handler(w: &World) -> GrantSubscriptionHandler {
        GrantSubscriptionHandler::new(w.db.clone(), w.db.clone(), w.notifications.clone())
    }

    #[tokio::test]
    async fn creates_income_follow_and_binding() {
        let w = World::new();
        let tier = w.tier("100", false);
        let buyer = UserId::new();

        let outcome = handler(&w)
            .handle(&grant(tier.id.as_uuid(), buyer, "100", Some(1)))
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::Granted);
        assert_eq!(w.db.incomes().len(), 1);
        assert_eq!(w.db.incomes()[0].owner_id, w.owner);
        assert!(w.is_following(buyer).await);

        let subs = w.db.subscriptions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].subscription_id, tier.id);
        assert_eq!(subs[0].status, SubscriptionStatus::ActiveUntilExpiry);
        assert!(subs[0].is_active);
        let expires = subs[0].expires_at.unwrap();
        let expected = Timestamp::now().plus_hours(PAID_PERIOD_HOURS);
        assert!(!expires.is_after(&expected));
        assert!(expires.is_after(&Timestamp::now().plus_hours(PAID_PERIOD_HOURS - 1)));
    }

    #[tokio::test]
    async fn repeated_invoice_writes_nothing() {
        let w = World::new();
        let tier = w.tier("100", false);
        let buyer = UserId::new();
        let h = handler(&w);
        let request = grant(tier.id.as_uuid(), buyer, "100", Some(5));

        h.handle(&request).await.unwrap();
        let second = h.handle(&request).await.unwrap();

        assert_eq!(second, GrantOutcome::AlreadyGranted);
        assert_eq!(w.db.incomes().len(), 1);
        assert_eq!(w.db.subscriptions().len(), 1);
        assert_eq!(w.notifications.all().len(), 2);
    }

    #[tokio::test]
    async fn buying_a_cheaper_tier_keeps_the_running_higher_one() {
        let w = World::new();
        let low = w.tier("100", false);
        let high = w.tier("300", false);
        let buyer = UserId::new();
        let h = handler(&w);

        h.handle(&grant(high.id.as_uuid(), buyer, "300", Some(1))).await.unwrap();
        h.handle(&grant(low.id.as_uuid(), buyer, "100", Some(2))).await.unwrap();

        let subs = w.db.subscriptions();
        assert_eq!(subs.len(), 2);
        for tier in [low.id, high.id] {
            let binding = subs.iter().find(|s| s.subscription_id == tier).unwrap();
            assert!(binding.is_current());
            assert_eq!(binding.status, SubscriptionStatus::ActiveUntilExpiry);
        }
        assert_eq!(w.db.incomes().len(), 2);
    }

    #[tokio::test]
    async fn second_purchase_of_same_tier_extends_its_binding() {
        let w = World::new();
        let tier = w.tier("100", false);
        let buyer = UserId::new();
        let started = Timestamp::now().minus_secs(100 * 3600);
        let existing = UserSubscription::paid(buyer, tier.id, w.blog, started);
        let existing_id = existing.id;
        w.db.insert_subscription(existing);

        handler(&w)
            .handle(&grant(tier.id.as_uuid(), buyer, "100", Some(3)))
            .await
            .unwrap();

        let subs = w.db.subscriptions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, existing_id);
        assert!(subs[0].expires_at.unwrap().is_after(&started.plus_hours(PAID_PERIOD_HOURS)));
    }

    #[tokio::test]
    async fn paid_grant_leaves_the_free_lifetime_binding_alone() {
        let w = World::new();
        let free = w.tier("0", true);
        let paid = w.tier("100", false);
        let buyer = UserId::new();
        w.db.insert_subscription(UserSubscription::lifetime(buyer, free.id, w.blog, Timestamp::now()));

        handler(&w)
            .handle(&grant(paid.id.as_uuid(), buyer, "100", Some(4)))
            .await
            .unwrap();

        let subs = w.db.subscriptions();
        assert_eq!(subs.len(), 2);
        let lifetime = subs.iter().find(|s| s.subscription_id == free.id).unwrap();
        assert_eq!(lifetime.status, SubscriptionStatus::Lifetime);
        assert_eq!(lifetime.expires_at, None);
    }

    #[tokio::test]
    async fn notifies_owner_and_buyer() {
        let w = World::new();
        let tier = w.tier("100", false);
        let buyer = UserId::new();

        handler(&w)
            .handle(&grant(tier.id.as_uuid(), buyer, "100", None))
            .await
            .unwrap();

        assert!(matches!(
            w.notifications.for_recipient(w.owner)[0].event,
            NotificationEvent::NewSubscriber { .. }
        ));
        assert!(matches!(
            w.notifications.for_recipient(buyer)[0].event,
            NotificationEvent::SubscriptionActivated { .. }
        ));
    }

    #[tokio::test]
    async fn free_or_unknown_tier_is_rejected() {
        let w = World::new();
        let free = w.tier("0", true);
        let h = handler(&w);

        assert!(matches!(
            h.handle(&grant(free.id.as_uuid(), UserId::new(), "0", None)).await,
            Err(EntitlementError::NotPurchasable(_))
        ));
        assert!(matches!(
            h.handle(&grant(&uuid::Uuid::new_v4(), UserId::new(), "10", None)).await,
            Err(EntitlementError::SubscriptionNotFound(_))
        ));
        assert!(w.db.incomes().is_empty());
    }

    #[tokio::test]
    async fn income_carries_invoice_id() {
        let w = World::new();
        let tier = w.tier("100", false);
        handler(&w)
            .handle(&grant(tier.id.as_uuid(), UserId::new(), "100", Some(77)))
            .await
            .unwrap();
        assert_eq!(w.db.incomes()[0].invoice_id, Some(InvoiceId::new(77)));
    }
}
