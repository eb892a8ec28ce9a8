//! Lapses paid bindings whose period has run out.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entitlement::UserSubscription;
use crate::domain::foundation::{DomainError, Timestamp, UserSubscriptionId};
use crate::ports::ReconciliationStore;

use super::PeriodicWorker;

pub struct SubscriptionExpiryWorker {
    store: Arc<dyn ReconciliationStore>,
}

impl SubscriptionExpiryWorker {
    pub fn new(store: Arc<dyn ReconciliationStore>) -> Self {
        Self { store }
    }
}

/// Bindings among `candidates` that are due to lapse at `now`.
///
/// Recurrent and lifetime bindings never lapse here even when `expires_at`
/// is in the past.
pub fn due_for_expiry(candidates: &[UserSubscription], now: Timestamp) -> Vec<UserSubscriptionId> {
    candidates
        .iter()
        .filter(|s| s.should_expire(now))
        .map(|s| s.id)
        .collect()
}

#[async_trait]
impl PeriodicWorker for SubscriptionExpiryWorker {
    fn name(&self) -> &'static str {
        "subscription_expiry"
    }

    async fn tick(&self) -> Result<u64, DomainError> {
        let now = Timestamp::now();
        let lapsed = self.store.find_lapsed_subscriptions(now).await?;
        let due = due_for_expiry(&lapsed, now);
        if due.is_empty() {
            return Ok(0);
        }
        let expired = self.store.expire_subscriptions(&due, now).await?;
        tracing::info!(expired, "Expired lapsed subscriptions");
        Ok(expired)
    }
}
