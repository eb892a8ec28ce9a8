//! Binding between a viewer and a blog tier.
//!
//! One row per `(user, tier)`. A paid grant extends the row for the bought
//! tier to lapse 720 hours from the grant; a free subscribe makes the row for
//! the free tier a lifetime binding. Rows for other tiers are never touched.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BlogId, StateMachine, SubscriptionId, Timestamp, UserId, UserSubscriptionId,
};

use super::{EntitlementError, SubscriptionStatus};

/// Length of the period bought by one paid grant.
pub const PAID_PERIOD_HOURS: i64 = 720;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubscription {
    pub id: UserSubscriptionId,
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub blog_id: BlogId,
    pub status: SubscriptionStatus,
    pub is_active: bool,
    /// `None` for lifetime bindings.
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserSubscription {
    /// New binding for a paid tier, lapsing one period after `now`.
    pub fn paid(user_id: UserId, tier: SubscriptionId, blog_id: BlogId, now: Timestamp) -> Self {
        Self {
            id: UserSubscriptionId::new(),
            user_id,
            subscription_id: tier,
            blog_id,
            status: SubscriptionStatus::ActiveUntilExpiry,
            is_active: true,
            expires_at: Some(now.plus_hours(PAID_PERIOD_HOURS)),
            created_at: now,
            updated_at: now,
        }
    }

    /// New lifetime binding for a free tier.
    pub fn lifetime(user_id: UserId, tier: SubscriptionId, blog_id: BlogId, now: Timestamp) -> Self {
        Self {
            id: UserSubscriptionId::new(),
            user_id,
            subscription_id: tier,
            blog_id,
            status: SubscriptionStatus::Lifetime,
            is_active: true,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the binding grants access.
    pub fn is_current(&self) -> bool {
        self.is_active && self.status != SubscriptionStatus::Expired
    }

    /// True when the expiry worker should lapse this binding.
    pub fn should_expire(&self, now: Timestamp) -> bool {
        self.is_active
            && self.status == SubscriptionStatus::ActiveUntilExpiry
            && self.expires_at.map_or(false, |at| at.is_before(&now))
    }

    /// Applies a paid grant for this tier: restarts the period from `now`.
    pub fn renew_paid(&mut self, now: Timestamp) -> Result<(), EntitlementError> {
        self.transition(SubscriptionStatus::ActiveUntilExpiry)?;
        self.is_active = true;
        self.expires_at = Some(now.plus_hours(PAID_PERIOD_HOURS));
        self.updated_at = now;
        Ok(())
    }

    /// Applies a free subscribe. Returns `false` when the binding is already
    /// current, in which case it is left untouched.
    pub fn subscribe_free(&mut self, now: Timestamp) -> Result<bool, EntitlementError> {
        if self.is_current() {
            return Ok(false);
        }
        self.transition(SubscriptionStatus::Lifetime)?;
        self.is_active = true;
        self.expires_at = None;
        self.updated_at = now;
        Ok(true)
    }

    /// Lapses the binding.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), EntitlementError> {
        self.transition(SubscriptionStatus::Expired)?;
        self.is_active = false;
        self.updated_at = now;
        Ok(())
    }

    fn transition(&mut self, target: SubscriptionStatus) -> Result<(), EntitlementError> {
        let next = self.status.transition_to(target).map_err(|_| {
            EntitlementError::invalid_state(self.status.as_str(), target.as_str())
        })?;
        self.status = next;
        Ok(())
    }
}
