//! Invoice status state machine.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle of a purchase intent.
///
/// ```text
/// new ──► confirmed
///  │          ▲
///  ├──► expired (superseded by a fresh invoice; a late payment may still confirm it)
///  └──► failed  (gateway refused to mint an invoice)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Awaiting payment.
    New,
    /// Payment confirmed and entitlement granted.
    Confirmed,
    /// Timed out and replaced by a newer invoice.
    Expired,
    /// Provider-side creation failed.
    Failed,
}

impl InvoiceStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::New => "new",
            InvoiceStatus::Confirmed => "confirmed",
            InvoiceStatus::Expired => "expired",
            InvoiceStatus::Failed => "failed",
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(InvoiceStatus::New),
            "confirmed" => Ok(InvoiceStatus::Confirmed),
            "expired" => Ok(InvoiceStatus::Expired),
            "failed" => Ok(InvoiceStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown invoice status '{}'", other),
            )),
        }
    }
}

/// `Expired -> Confirmed` covers a payment that lands after the link lapsed.
impl StateMachine for InvoiceStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use InvoiceStatus::*;
        match self {
            New => vec![Confirmed, Expired, Failed],
            Expired => vec![Confirmed],
            Confirmed | Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_can_reach_every_outcome() {
        let status = InvoiceStatus::New;
        assert!(status.can_transition_to(&InvoiceStatus::Confirmed));
        assert!(status.can_transition_to(&InvoiceStatus::Expired));
        assert!(status.can_transition_to(&InvoiceStatus::Failed));
    }

    #[test]
    fn late_payment_confirms_expired_invoice() {
        assert_eq!(
            InvoiceStatus::Expired.transition_to(InvoiceStatus::Confirmed),
            Ok(InvoiceStatus::Confirmed)
        );
    }

    #[test]
    fn confirmed_and_failed_are_terminal() {
        assert!(InvoiceStatus::Confirmed.is_terminal());
        assert!(InvoiceStatus::Failed.is_terminal());
        assert!(!InvoiceStatus::Expired.is_terminal());
    }

    #[test]
    fn failed_cannot_be_confirmed() {
        assert!(InvoiceStatus::Failed
            .transition_to(InvoiceStatus::Confirmed)
            .is_err());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [
            InvoiceStatus::New,
            InvoiceStatus::Confirmed,
            InvoiceStatus::Expired,
            InvoiceStatus::Failed,
        ] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target));
            }
            assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), status);
        }
    }
}
