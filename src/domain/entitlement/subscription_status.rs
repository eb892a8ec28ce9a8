//! Lifecycle of a viewer's subscription binding.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a [`UserSubscription`](super::UserSubscription).
///
/// ```text
/// recurrent ─┐
///            ├──► active_until_expiry ──► expired
/// expired ───┘          │  ▲                 │
///                       └──┘ (renewal)       └──► lifetime
/// ```
///
/// `Lifetime` is terminal: a free binding never becomes a paid period.
///
/// `ActiveUntilExpiry` is what every paid grant produces. It is stored as
/// `"cancelled"`: the binding stays active until `expires_at` and then lapses
/// unless renewed by another payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Auto-renewing; never expired by the expiry worker.
    Recurrent,
    /// Paid period running; lapses at `expires_at`.
    #[serde(rename = "cancelled")]
    ActiveUntilExpiry,
    Expired,
    /// Free tier; no expiry.
    Lifetime,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Recurrent => "recurrent",
            SubscriptionStatus::ActiveUntilExpiry => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Lifetime => "lifetime",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recurrent" => Ok(SubscriptionStatus::Recurrent),
            "cancelled" => Ok(SubscriptionStatus::ActiveUntilExpiry),
            "expired" => Ok(SubscriptionStatus::Expired),
            "lifetime" => Ok(SubscriptionStatus::Lifetime),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Recurrent => vec![ActiveUntilExpiry],
            ActiveUntilExpiry => vec![ActiveUntilExpiry, Expired],
            Expired => vec![ActiveUntilExpiry, Lifetime],
            Lifetime => vec![],
        }
    }
}
