//! Grant requests sent from a confirmed invoice to the owning service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::billing::Invoice;
use crate::domain::foundation::{Amount, Currency, InvoiceId, UserId};

/// Body of every grant endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    pub item_id: Uuid,
    pub user_id: UserId,
    pub value: Amount,
    #[serde(default)]
    pub currency: Currency,
    /// Paying invoice, when the grant comes from a payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<InvoiceId>,
}

impl GrantRequest {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            item_id: invoice.item_id,
            user_id: invoice.user_id,
            value: invoice.out_sum,
            currency: Currency::Rub,
            invoice_id: Some(invoice.id),
        }
    }
}

/// Result of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantOutcome {
    Granted,
    /// The invoice was already turned into an entitlement; nothing was written.
    AlreadyGranted,
}
