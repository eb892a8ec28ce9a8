//! Scriptable payment gateway for tests and local runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ports::{GatewayInvoice, GatewayInvoiceRequest, PaymentError, PaymentGateway};

/// Hands out `mock-<inv_id>` ids unless an error is queued.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.fail_next(PaymentError::network("down"));
/// ```
#[derive(Default)]
pub struct MockPaymentGateway {
    queued_errors: Mutex<VecDeque<PaymentError>>,
    calls: Mutex<Vec<GatewayInvoiceRequest>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with `error`.
    pub fn fail_next(&self, error: PaymentError) {
        if let Ok(mut errors) = self.queued_errors.lock() {
            errors.push_back(error);
        }
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<GatewayInvoiceRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_invoice(
        &self,
        request: &GatewayInvoiceRequest,
    ) -> Result<GatewayInvoice, PaymentError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        let queued = self
            .queued_errors
            .lock()
            .ok()
            .and_then(|mut errors| errors.pop_front());
        if let Some(error) = queued {
            return Err(error);
        }
        Ok(GatewayInvoice {
            provider_id: format!("mock-{}", request.inv_id),
        })
    }
}
