//! Invoice aggregate.
//!
//! An invoice is a durable purchase intent. It is created before the gateway is
//! contacted so that the gateway receives a stable numeric id, and it is never
//! deleted.
//!
//! # Invariants
//!
//! - At most one invoice per `(user_id, item_id)` is `new` and unexpired at a time.
//! - Status changes follow [`InvoiceStatus`] transitions.
//! - `payment_link` is only set while the invoice is `new`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{Amount, InvoiceId, StateMachine, Timestamp, UserId};

use super::{BillingError, InvoiceStatus, ItemType};

/// Invoice fields known before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub out_sum: Amount,
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub user_id: UserId,
    pub description: String,
    pub expires_at: Timestamp,
}

impl NewInvoice {
    /// Drafts an invoice that expires `ttl_secs` after `now`.
    pub fn draft(
        out_sum: Amount,
        item_id: Uuid,
        item_type: ItemType,
        user_id: UserId,
        description: impl Into<String>,
        now: Timestamp,
        ttl_secs: i64,
    ) -> Self {
        Self {
            out_sum,
            item_id,
            item_type,
            user_id,
            description: description.into(),
            expires_at: now.plus_secs(ttl_secs),
        }
    }
}

/// A persisted purchase intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub out_sum: Amount,
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub user_id: UserId,
    pub description: String,
    pub expires_at: Timestamp,
    pub status: InvoiceStatus,
    pub payment_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Invoice {
    /// Materializes a draft once the store has assigned its id.
    pub fn from_draft(id: InvoiceId, draft: NewInvoice, now: Timestamp) -> Self {
        Self {
            id,
            out_sum: draft.out_sum,
            item_id: draft.item_id,
            item_type: draft.item_type,
            user_id: draft.user_id,
            description: draft.description,
            expires_at: draft.expires_at,
            status: InvoiceStatus::New,
            payment_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once `expires_at` has passed.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    /// Records the link minted by the gateway.
    pub fn attach_payment_link(&mut self, link: String) -> Result<(), BillingError> {
        if self.status != InvoiceStatus::New {
            return Err(self.invalid("attach a payment link to"));
        }
        self.payment_link = Some(link);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Marks the invoice failed after a gateway error.
    pub fn mark_failed(&mut self) -> Result<(), BillingError> {
        self.transition(InvoiceStatus::Failed, "fail")
    }

    /// Marks the invoice expired so a fresh one can supersede it.
    pub fn mark_expired(&mut self) -> Result<(), BillingError> {
        self.transition(InvoiceStatus::Expired, "expire")
    }

    /// Marks the invoice paid. Call only after the entitlement was granted.
    pub fn confirm(&mut self) -> Result<(), BillingError> {
        self.transition(InvoiceStatus::Confirmed, "confirm")
    }

    fn transition(&mut self, target: InvoiceStatus, attempted: &str) -> Result<(), BillingError> {
        let next = self
            .status
            .transition_to(target)
            .map_err(|_| self.invalid(attempted))?;
        self.status = next;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn invalid(&self, attempted: &str) -> BillingError {
        BillingError::invalid_state(self.status.as_str(), attempted)
    }
}

/// What a payment-link request should do given the latest invoice for the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentLinkDecision {
    /// Hand out the link of the still-valid invoice.
    Reuse { link: String },
    /// Create a fresh invoice.
    Create,
    /// Expire the stale `new` invoice, then create a fresh one.
    Supersede,
}

impl PaymentLinkDecision {
    /// Decides from the most recent invoice of a `(user, item)` pair.
    ///
    /// A `new` invoice without a link never finished creation and is superseded.
    pub fn decide(latest: Option<&Invoice>, now: Timestamp) -> Self {
        let Some(invoice) = latest else {
            return PaymentLinkDecision::Create;
        };

        match invoice.status {
            InvoiceStatus::Confirmed | InvoiceStatus::Failed | InvoiceStatus::Expired => {
                PaymentLinkDecision::Create
            }
            InvoiceStatus::New => match (&invoice.payment_link, invoice.is_expired_at(now)) {
                (Some(link), false) => PaymentLinkDecision::Reuse { link: link.clone() },
                _ => PaymentLinkDecision::Supersede,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(status: InvoiceStatus, link: Option<&str>, expires_in_secs: i64) -> Invoice {
        let now = Timestamp::now();
        let draft = NewInvoice::draft(
            "100.00".parse().unwrap(),
            Uuid::new_v4(),
            ItemType::Post,
            UserId::new(),
            "Post access",
            now,
            expires_in_secs,
        );
        let mut inv = Invoice::from_draft(InvoiceId::new(1), draft, now);
        inv.status = status;
        inv.payment_link = link.map(String::from);
        inv
    }

    #[test]
    fn no_previous_invoice_creates() {
        assert_eq!(
            PaymentLinkDecision::decide(None, Timestamp::now()),
            PaymentLinkDecision::Create
        );
    }

    #[test]
    fn live_new_invoice_is_reused() {
        let inv = invoice(InvoiceStatus::New, Some("https://pay/1"), 3600);
        assert_eq!(
            PaymentLinkDecision::decide(Some(&inv), Timestamp::now()),
            PaymentLinkDecision::Reuse {
                link: "https://pay/1".into()
            }
        );
    }

    #[test]
    fn expired_new_invoice_is_superseded() {
        let inv = invoice(InvoiceStatus::New, Some("https://pay/1"), -1);
        assert_eq!(
            PaymentLinkDecision::decide(Some(&inv), Timestamp::now()),
            PaymentLinkDecision::Supersede
        );
    }

    #[test]
    fn new_invoice_without_link_is_superseded() {
        let inv = invoice(InvoiceStatus::New, None, 3600);
        assert_eq!(
            PaymentLinkDecision::decide(Some(&inv), Timestamp::now()),
            PaymentLinkDecision::Supersede
        );
    }

    #[test]
    fn terminal_invoices_lead_to_creation() {
        for status in [
            InvoiceStatus::Confirmed,
            InvoiceStatus::Failed,
            InvoiceStatus::Expired,
        ] {
            let inv = invoice(status, Some("https://pay/1"), 3600);
            assert_eq!(
                PaymentLinkDecision::decide(Some(&inv), Timestamp::now()),
                PaymentLinkDecision::Create
            );
        }
    }

    #[test]
    fn confirm_moves_new_to_confirmed() {
        let mut inv = invoice(InvoiceStatus::New, Some("l"), 3600);
        inv.confirm().unwrap();
        assert_eq!(inv.status, InvoiceStatus::Confirmed);
    }

    #[test]
    fn confirm_twice_is_rejected() {
        let mut inv = invoice(InvoiceStatus::Confirmed, Some("l"), 3600);
        assert!(matches!(
            inv.confirm(),
            Err(BillingError::InvalidState { .. })
        ));
    }

    #[test]
    fn failed_invoice_cannot_take_a_link() {
        let mut inv = invoice(InvoiceStatus::Failed, None, 3600);
        assert!(inv.attach_payment_link("x".into()).is_err());
    }

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let inv = invoice(InvoiceStatus::New, Some("l"), 0);
        assert!(inv.is_expired_at(inv.expires_at));
    }
}
