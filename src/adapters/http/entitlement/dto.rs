//! Response bodies for the entitlement endpoints. Grant requests use
//! [`GrantRequest`](crate::domain::entitlement::GrantRequest) directly.

use serde::{Deserialize, Serialize};

use crate::application::handlers::entitlement::SubscribeFreeResult;
use crate::domain::entitlement::{GrantOutcome, SubscriptionStatus};
use crate::domain::foundation::{SubscriptionId, UserSubscriptionId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantResponse {
    pub outcome: GrantOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeFreeResponse {
    pub id: UserSubscriptionId,
    pub subscription_id: SubscriptionId,
    pub status: SubscriptionStatus,
    /// `false` when the viewer already held a current subscription.
    pub changed: bool,
}

impl From<SubscribeFreeResult> for SubscribeFreeResponse {
    fn from(result: SubscribeFreeResult) -> Self {
        Self {
            id: result.subscription.id,
            subscription_id: result.subscription.subscription_id,
            status: result.subscription.status,
            changed: result.changed,
        }
    }
}
