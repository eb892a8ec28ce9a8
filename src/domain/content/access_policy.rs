//! Read-access decision for a single post.
//!
//! The decision itself is pure: the caller gathers [`AccessFacts`] for the
//! post's mode and [`evaluate`] answers. Only the lazy tier assignment of
//! subscription-gated posts has a side effect, and that is reported through
//! [`RequiredTier::NeedsAssignment`] for the caller to persist.

use crate::domain::foundation::{SubscriptionId, UserId};

use super::{AccessMode, Post, TierLadder};

/// Everything the decision may need to know about the viewer and the blog.
///
/// Fields irrelevant to the post's mode may be left at their defaults.
#[derive(Debug, Clone, Default)]
pub struct AccessFacts {
    pub ladder: TierLadder,
    pub follows_blog: bool,
    /// Tiers of this blog the viewer holds through an active subscription.
    pub held_tiers: Vec<SubscriptionId>,
    pub purchased: bool,
}

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantReason {
    Author,
    Public,
    /// Follow-gated post on a blog without a free tier.
    NoFreeTier,
    /// Subscription-gated post on a blog without a paid tier.
    NoPaidTier,
    Follower,
    Subscriber(SubscriptionId),
    Purchased,
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Anonymous,
    NotFollowing,
    InsufficientTier,
    NotPurchased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(GrantReason),
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted(_))
    }
}

/// Minimum tier a subscription-gated post requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredTier {
    /// The blog has no paid tier; the gate is open.
    Ungated,
    /// The post's stored tier.
    Assigned(SubscriptionId),
    /// The post had no usable tier; the cheapest paid tier applies and should be stored.
    NeedsAssignment(SubscriptionId),
}

impl RequiredTier {
    /// Resolves the gate of a post against its blog's ladder.
    ///
    /// A stored tier that is not on the ladder is treated like a missing one.
    pub fn resolve(post: &Post, ladder: &TierLadder) -> Self {
        let Some(first_paid) = ladder.first_paid() else {
            return RequiredTier::Ungated;
        };
        match post.subscription_id {
            Some(id) if ladder.position(id).is_some() => RequiredTier::Assigned(id),
            _ => RequiredTier::NeedsAssignment(first_paid.id),
        }
    }

    pub fn tier_id(&self) -> Option<SubscriptionId> {
        match self {
            RequiredTier::Ungated => None,
            RequiredTier::Assigned(id) | RequiredTier::NeedsAssignment(id) => Some(*id),
        }
    }
}

/// Decides whether `viewer` may read `post`. `None` is an anonymous viewer.
pub fn evaluate(post: &Post, viewer: Option<UserId>, facts: &AccessFacts) -> AccessDecision {
    use AccessDecision::{Denied, Granted};

    if viewer.map_or(false, |v| post.is_authored_by(v)) {
        return Granted(GrantReason::Author);
    }

    match post.access_mode {
        AccessMode::Public => Granted(GrantReason::Public),

        AccessMode::FollowGated => {
            if !facts.ladder.has_free_tier() {
                Granted(GrantReason::NoFreeTier)
            } else if viewer.is_none() {
                Denied(DenyReason::Anonymous)
            } else if facts.follows_blog {
                Granted(GrantReason::Follower)
            } else {
                Denied(DenyReason::NotFollowing)
            }
        }

        AccessMode::SubscriptionGated => {
            let required = match RequiredTier::resolve(post, &facts.ladder).tier_id() {
                None => return Granted(GrantReason::NoPaidTier),
                Some(id) => id,
            };
            if viewer.is_none() {
                return Denied(DenyReason::Anonymous);
            }
            facts
                .ladder
                .satisfying(required)
                .iter()
                .find(|tier| facts.held_tiers.contains(&tier.id))
                .map(|tier| Granted(GrantReason::Subscriber(tier.id)))
                .unwrap_or(Denied(DenyReason::InsufficientTier))
        }

        AccessMode::PayPerItem => {
            if viewer.is_none() {
                Denied(DenyReason::Anonymous)
            } else if facts.purchased {
                Granted(GrantReason::Purchased)
            } else {
                Denied(DenyReason::NotPurchased)
            }
        }
    }
}
