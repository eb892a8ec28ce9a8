//! CheckPostAccessHandler - Answers "may this viewer read this post?".
//!
//! Gathers only the facts the post's access mode needs, then defers to the
//! pure [`evaluate`]. A subscription-gated post without a usable tier gets the
//! blog's cheapest paid tier assigned and stored here.

use std::sync::Arc;

use crate::domain::content::access_policy::evaluate;
use crate::domain::content::{AccessDecision, AccessError, AccessFacts, AccessMode, Post, RequiredTier};
use crate::domain::entitlement::UserSubscription;
use crate::domain::foundation::{PostId, UserId};
use crate::ports::{ContentRepository, EntitlementStore};

#[derive(Debug, Clone, Copy)]
pub struct CheckPostAccessQuery {
    pub post_id: PostId,
    /// `None` for anonymous viewers.
    pub viewer: Option<UserId>,
}

pub struct CheckPostAccessHandler {
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn EntitlementStore>,
}

impl CheckPostAccessHandler {
    pub fn new(content: Arc<dyn ContentRepository>, store: Arc<dyn EntitlementStore>) -> Self {
        Self { content, store }
    }

    pub async fn handle(&self, query: CheckPostAccessQuery) -> Result<AccessDecision, AccessError> {
        let post = self
            .content
            .find_post(query.post_id)
            .await?
            .ok_or(AccessError::PostNotFound(query.post_id))?;

        let facts = self.gather_facts(&post, query.viewer).await?;
        let decision = evaluate(&post, query.viewer, &facts);

        tracing::debug!(
            post_id = %post.id,
            viewer = ?query.viewer,
            mode = post.access_mode.code(),
            decision = ?decision,
            "Access evaluated"
        );
        Ok(decision)
    }

    async fn gather_facts(&self, post: &Post, viewer: Option<UserId>) -> Result<AccessFacts, AccessError> {
        let mut facts = AccessFacts::default();
        if viewer.map_or(false, |v| post.is_authored_by(v)) {
            return Ok(facts);
        }

        match post.access_mode {
            AccessMode::Public => {}

            AccessMode::FollowGated => {
                facts.ladder = self.content.tier_ladder(post.blog_id).await?;
                if let Some(viewer) = viewer {
                    facts.follows_blog = self.store.is_following(viewer, post.blog_id).await?;
                }
            }

            AccessMode::SubscriptionGated => {
                facts.ladder = self.content.tier_ladder(post.blog_id).await?;
                if let RequiredTier::NeedsAssignment(tier) = RequiredTier::resolve(post, &facts.ladder) {
                    self.content.assign_post_tier(post.id, tier).await?;
                    tracing::info!(post_id = %post.id, tier_id = %tier, "Assigned minimum tier to post");
                }
                if let Some(viewer) = viewer {
                    facts.held_tiers = self
                        .store
                        .list_subscriptions(viewer, post.blog_id)
                        .await?
                        .into_iter()
                        .filter(UserSubscription::is_current)
                        .map(|sub| sub.subscription_id)
                        .collect();
                }
            }

            AccessMode::PayPerItem => {
                if let Some(viewer) = viewer {
                    facts.purchased = self.store.has_paid_access(post.id, viewer).await?;
                }
            }
        }
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::entitlement::test_support::World;
    use crate::domain::content::{DenyReason, GrantReason};
    use crate::domain::entitlement::{PostPaidAccess, UserFollow};
    use crate::domain::foundation::{SubscriptionId, Timestamp};
    use crate::ports::PostPurchase;

    fn handler(w: &World) -> CheckPostAccessHandler {
        CheckPostAccessHandler::new(w.db.clone(), w.db.clone())
    }

    async fn check(w: &World, post: PostId, viewer: Option<UserId>) -> AccessDecision {
        handler(w)
            .handle(CheckPostAccessQuery { post_id: post, viewer })
            .await
            .unwrap()
    }

    fn hold(w: &World, viewer: UserId, tier: SubscriptionId) {
        w.db.insert_subscription(UserSubscription::paid(viewer, tier, w.blog, Timestamp::now()));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Subscription ladder
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn higher_tier_passes_free_only_fails() {
        let w = World::new();
        let free = w.tier("0", true);
        let mid = w.tier("100", false);
        let top = w.tier("300", false);
        let post = w.post(AccessMode::SubscriptionGated, Some(mid.id));

        let top_holder = UserId::new();
        hold(&w, top_holder, top.id);
        let free_holder = UserId::new();
        w.db.insert_subscription(UserSubscription::lifetime(free_holder, free.id, w.blog, Timestamp::now()));

        assert_eq!(
            check(&w, post.id, Some(top_holder)).await,
            AccessDecision::Granted(GrantReason::Subscriber(top.id))
        );
        assert_eq!(
            check(&w, post.id, Some(free_holder)).await,
            AccessDecision::Denied(DenyReason::InsufficientTier)
        );
        assert_eq!(
            check(&w, post.id, None).await,
            AccessDecision::Denied(DenyReason::Anonymous)
        );
    }

    #[tokio::test]
    async fn unassigned_post_gets_first_paid_tier_persisted() {
        let w = World::new();
        w.tier("0", true);
        let cheapest = w.tier("100", false);
        w.tier("300", false);
        let post = w.post(AccessMode::SubscriptionGated, None);

        check(&w, post.id, None).await;

        assert_eq!(w.db.post(post.id).unwrap().subscription_id, Some(cheapest.id));
    }

    #[tokio::test]
    async fn expired_binding_does_not_count() {
        let w = World::new();
        let tier = w.tier("100", false);
        let post = w.post(AccessMode::SubscriptionGated, Some(tier.id));
        let viewer = UserId::new();
        let mut sub = UserSubscription::paid(viewer, tier.id, w.blog, Timestamp::now());
        sub.expire(Timestamp::now()).unwrap();
        w.db.insert_subscription(sub);

        assert!(!check(&w, post.id, Some(viewer)).await.is_granted());
    }

    #[tokio::test]
    async fn every_current_binding_on_the_blog_counts() {
        let w = World::new();
        let mid = w.tier("100", false);
        let top = w.tier("300", false);
        let post = w.post(AccessMode::SubscriptionGated, Some(top.id));
        let viewer = UserId::new();
        hold(&w, viewer, top.id);
        hold(&w, viewer, mid.id);

        assert_eq!(
            check(&w, post.id, Some(viewer)).await,
            AccessDecision::Granted(GrantReason::Subscriber(top.id))
        );
    }

    #[tokio::test]
    async fn blog_without_paid_tier_is_open() {
        let w = World::new();
        w.tier("0", true);
        let post = w.post(AccessMode::SubscriptionGated, None);
        assert_eq!(
            check(&w, post.id, None).await,
            AccessDecision::Granted(GrantReason::NoPaidTier)
        );
        assert_eq!(w.db.post(post.id).unwrap().subscription_id, None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Other modes
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn follow_gate_without_free_tier_is_public() {
        let w = World::new();
        w.tier("100", false);
        let post = w.post(AccessMode::FollowGated, None);
        assert!(check(&w, post.id, None).await.is_granted());
    }

    #[tokio::test]
    async fn follow_gate_requires_follow() {
        let w = World::new();
        w.tier("0", true);
        let post = w.post(AccessMode::FollowGated, None);
        let viewer = UserId::new();

        assert!(!check(&w, post.id, Some(viewer)).await.is_granted());
        w.db
            .follow(&UserFollow {
                user_id: viewer,
                blog_id: w.blog,
                created_at: Timestamp::now(),
            })
            .await
            .unwrap();
        assert!(check(&w, post.id, Some(viewer)).await.is_granted());
    }

    #[tokio::test]
    async fn pay_per_item_requires_purchase() {
        let w = World::new();
        let post = w.post(AccessMode::PayPerItem, None);
        let viewer = UserId::new();
        assert!(!check(&w, post.id, Some(viewer)).await.is_granted());

        w.db
            .record_post_purchase(&PostPurchase {
                income: crate::domain::entitlement::BlogIncome::record(
                    w.blog,
                    w.owner,
                    viewer,
                    "10".parse().unwrap(),
                    Default::default(),
                    crate::domain::billing::ItemType::Post,
                    *post.id.as_uuid(),
                    None,
                    Timestamp::now(),
                ),
                access: Some(PostPaidAccess {
                    post_id: post.id,
                    user_id: viewer,
                    created_at: Timestamp::now(),
                }),
            })
            .await
            .unwrap();
        assert!(check(&w, post.id, Some(viewer)).await.is_granted());
    }

    #[tokio::test]
    async fn author_always_reads() {
        let w = World::new();
        let post = w.post(AccessMode::PayPerItem, None);
        assert_eq!(
            check(&w, post.id, Some(w.owner)).await,
            AccessDecision::Granted(GrantReason::Author)
        );
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let w = World::new();
        let result = handler(&w)
            .handle(CheckPostAccessQuery {
                post_id: PostId::new(),
                viewer: None,
            })
            .await;
        assert!(matches!(result, Err(AccessError::PostNotFound(_))));
    }
}
