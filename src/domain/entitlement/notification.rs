//! Notification events pushed to blog owners and buyers.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Amount, BlogId, PostId, SubscriptionId, UserId};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// To the owner: someone bought a tier.
    NewSubscriber {
        blog_id: BlogId,
        subscription_id: SubscriptionId,
        subscriber_id: UserId,
    },
    /// To the buyer: the tier is active.
    SubscriptionActivated {
        blog_id: BlogId,
        subscription_id: SubscriptionId,
    },
    /// To the owner: a post was sold.
    PostSold { post_id: PostId, buyer_id: UserId, amount: Amount },
    /// To the buyer: the post is unlocked.
    PostUnlocked { post_id: PostId },
    /// To the owner.
    DonationReceived { blog_id: BlogId, donor_id: UserId, amount: Amount },
    /// To the donor.
    DonationSent { blog_id: BlogId, amount: Amount },
}

/// A message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: UserId,
    #[serde(flatten)]
    pub event: NotificationEvent,
}

impl Notification {
    pub fn new(recipient: UserId, event: NotificationEvent) -> Self {
        Self { recipient, event }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self.event {
            NotificationEvent::NewSubscriber { .. } => "new_subscriber",
            NotificationEvent::SubscriptionActivated { .. } => "subscription_activated",
            NotificationEvent::PostSold { .. } => "post_sold",
            NotificationEvent::PostUnlocked { .. } => "post_unlocked",
            NotificationEvent::DonationReceived { .. } => "donation_received",
            NotificationEvent::DonationSent { .. } => "donation_sent",
        }
    }
}
