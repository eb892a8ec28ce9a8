//! Payment gateway port.
//!
//! The gateway mints a provider-side invoice for a locally stored one. The
//! buyer is then sent to `payment_link_prefix + provider_id`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Amount, DomainError, ErrorCode, InvoiceId};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registers an invoice with the provider.
    async fn create_invoice(
        &self,
        request: &GatewayInvoiceRequest,
    ) -> Result<GatewayInvoice, PaymentError>;
}

/// What the provider needs to mint an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayInvoiceRequest {
    pub inv_id: InvoiceId,
    pub out_sum: Amount,
    pub description: String,
}

/// Provider-side invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayInvoice {
    /// Provider id appended to the payment link prefix.
    pub provider_id: String,
}

/// Errors from the payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Provider's own error text, if it sent one.
    pub provider_message: Option<String>,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_message: None,
        }
    }

    pub fn with_provider_message(mut self, message: impl Into<String>) -> Self {
        self.provider_message = Some(message.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Rejected, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidResponse, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.provider_message {
            Some(provider) => write!(f, "{}: {} ({})", self.code, self.message, provider),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(ErrorCode::ExternalServiceError, err.to_string())
            .with_detail("service", "payment_gateway")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentErrorCode {
    /// Transport failure before a response arrived.
    NetworkError,
    /// Provider answered with `isSuccess = false`.
    Rejected,
    /// Response could not be understood.
    InvalidResponse,
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::Rejected => "rejected",
            PaymentErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}
