//! Billing-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidSignature | 400 |
//! | AmountMismatch | 400 |
//! | ValidationFailed | 400 |
//! | InvoiceNotFound | 404 |
//! | InvalidState | 409 |
//! | Gateway | 502 |
//! | GrantFailed | 503 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{Amount, DomainError, ErrorCode, InvoiceId, ValidationError};

/// Errors raised by the invoice state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Callback signature does not match the expected one.
    #[error("Invalid payment signature")]
    InvalidSignature,

    /// Callback references an invoice that does not exist.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Callback amount differs from the stored invoice amount.
    #[error("Amount mismatch: invoice has {expected}, callback reported {actual}")]
    AmountMismatch { expected: Amount, actual: Amount },

    /// Request failed validation.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// Transition not allowed from the current status.
    #[error("Cannot {attempted} invoice in {current} state")]
    InvalidState { current: String, attempted: String },

    /// The payment gateway refused or failed to create the invoice.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// The owning service failed to materialize the entitlement.
    #[error("Entitlement grant failed: {0}")]
    GrantFailed(String),

    /// Storage or other infrastructure failure.
    #[error("Error: {0}")]
    Infrastructure(String),
}

impl BillingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        BillingError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::InvalidSignature => ErrorCode::InvalidSignature,
            BillingError::InvoiceNotFound(_) => ErrorCode::InvoiceNotFound,
            BillingError::AmountMismatch { .. } | BillingError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            BillingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            BillingError::Gateway(_) | BillingError::GrantFailed(_) => {
                ErrorCode::ExternalServiceError
            }
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// True for errors that leave state untouched and can be re-delivered.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::GrantFailed(_) | BillingError::Infrastructure(_)
        )
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => BillingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::InvalidSignature => BillingError::InvalidSignature,
            ErrorCode::ExternalServiceError => BillingError::Gateway(err.message),
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        BillingError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
