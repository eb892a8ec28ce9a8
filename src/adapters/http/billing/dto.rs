//! Request and response bodies for the billing endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::billing::{ConfirmPaymentCommand, RequestPaymentLinkCommand};
use crate::domain::billing::{BillingError, ItemType};
use crate::domain::foundation::{Amount, InvoiceId, UserId};

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentLinkRequest {
    pub item_id: Uuid,
    pub item_type: ItemType,
    /// The buyer.
    pub user_id: UserId,
    pub sum: Amount,
    pub description: String,
}

impl From<PaymentLinkRequest> for RequestPaymentLinkCommand {
    fn from(req: PaymentLinkRequest) -> Self {
        Self {
            item_id: req.item_id,
            item_type: req.item_type,
            user_id: req.user_id,
            sum: req.sum,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLinkResponse {
    pub url: String,
}

/// Query string of the gateway's result callback.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmQuery {
    #[serde(rename = "OutSum")]
    pub out_sum: String,
    #[serde(rename = "InvId")]
    pub inv_id: i64,
    #[serde(rename = "SignatureValue")]
    pub signature: String,
}

impl TryFrom<ConfirmQuery> for ConfirmPaymentCommand {
    type Error = BillingError;

    fn try_from(query: ConfirmQuery) -> Result<Self, Self::Error> {
        let out_sum = query
            .out_sum
            .parse::<Amount>()
            .map_err(|e| BillingError::validation("OutSum", e.to_string()))?;
        Ok(Self {
            out_sum,
            inv_id: InvoiceId::new(query.inv_id),
            signature: query.signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_link_request_accepts_string_sum() {
        let body = serde_json::json!({
            "item_id": "2f6d8c1e-5c7a-4d36-9b1a-0c2f1f0e7a11",
            "item_type": "subscription",
            "user_id": "0b8e3f3a-6a51-4c4b-9d6e-2e9b1e4f5a22",
            "sum": "250.5",
            "description": "Gold tier"
        });
        let req: PaymentLinkRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.item_type, ItemType::Subscription);
        assert_eq!(req.sum.to_string(), "250.50");
    }

    #[test]
    fn confirm_query_rejects_unparseable_sum() {
        let query = ConfirmQuery {
            out_sum: "lots".to_string(),
            inv_id: 1,
            signature: "ab".to_string(),
        };
        let err = ConfirmPaymentCommand::try_from(query).unwrap_err();
        assert!(matches!(err, BillingError::ValidationFailed { .. }));
    }
}
