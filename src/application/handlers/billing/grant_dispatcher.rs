//! GrantDispatcher - Turns a paid invoice into the matching entitlement.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Invoice, ItemType};
use crate::domain::entitlement::{GrantOutcome, GrantRequest};
use crate::ports::EntitlementGranter;

pub struct GrantDispatcher {
    granter: Arc<dyn EntitlementGranter>,
}

impl GrantDispatcher {
    pub fn new(granter: Arc<dyn EntitlementGranter>) -> Self {
        Self { granter }
    }

    /// Calls the grant for the invoice's item type.
    ///
    /// Any failure is reported as [`BillingError::GrantFailed`] so the caller
    /// leaves the invoice untouched and the gateway redelivers.
    pub async fn dispatch(&self, invoice: &Invoice) -> Result<GrantOutcome, BillingError> {
        let request = GrantRequest::from_invoice(invoice);
        let result = match invoice.item_type {
            ItemType::Subscription => self.granter.grant_subscription(&request).await,
            ItemType::Post => self.granter.grant_post_access(&request).await,
            ItemType::Donation => self.granter.confirm_donation(&request).await,
        };

        result.map_err(|e| {
            tracing::error!(
                invoice_id = %invoice.id,
                item_type = %invoice.item_type,
                item_id = %invoice.item_id,
                error = %e,
                "Entitlement grant failed"
            );
            BillingError::GrantFailed(e.to_string())
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Granter that records calls and can be told to fail.
    #[derive(Default)]
    pub struct RecordingGranter {
        pub calls: Mutex<Vec<(&'static str, GrantRequest)>>,
        pub fail: Mutex<bool>,
    }

    impl RecordingGranter {
        pub fn failing() -> Self {
            let granter = Self::default();
            *granter.fail.lock().unwrap() = true;
            granter
        }

        pub fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        pub fn calls(&self) -> Vec<(&'static str, GrantRequest)> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, kind: &'static str, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
            if *self.fail.lock().unwrap() {
                return Err(DomainError::new(ErrorCode::ExternalServiceError, "content service down"));
            }
            self.calls.lock().unwrap().push((kind, request.clone()));
            Ok(GrantOutcome::Granted)
        }
    }

    #[async_trait]
    impl EntitlementGranter for RecordingGranter {
        async fn grant_subscription(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
            self.record("subscription", request)
        }

        async fn grant_post_access(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
            self.record("post", request)
        }

        async fn confirm_donation(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
            self.record("donation", request)
        }
    }
}
