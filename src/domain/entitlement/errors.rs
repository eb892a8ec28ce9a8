//! Entitlement error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | SubscriptionNotFound / PostNotFound / DonationNotFound | 404 |
//! | NotPurchasable / ValidationFailed | 400 |
//! | InvalidState | 409 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, DonationId, ErrorCode, PostId, SubscriptionId, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(SubscriptionId),

    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("Donation not found: {0}")]
    DonationNotFound(DonationId),

    /// The item exists but cannot be granted this way (free tier bought, paid tier subscribed for free).
    #[error("Item cannot be granted: {0}")]
    NotPurchasable(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Cannot move subscription from {current} to {attempted}")]
    InvalidState { current: String, attempted: String },

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl EntitlementError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EntitlementError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        EntitlementError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EntitlementError::SubscriptionNotFound(_) => ErrorCode::SubscriptionNotFound,
            EntitlementError::PostNotFound(_) => ErrorCode::PostNotFound,
            EntitlementError::DonationNotFound(_) => ErrorCode::DonationNotFound,
            EntitlementError::NotPurchasable(_) | EntitlementError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            EntitlementError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            EntitlementError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for EntitlementError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => EntitlementError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => EntitlementError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for EntitlementError {
    fn from(err: ValidationError) -> Self {
        EntitlementError::ValidationFailed {
            field: "request".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<EntitlementError> for DomainError {
    fn from(err: EntitlementError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        assert_eq!(
            EntitlementError::SubscriptionNotFound(SubscriptionId::new()).code(),
            ErrorCode::SubscriptionNotFound
        );
        assert_eq!(
            EntitlementError::DonationNotFound(DonationId::new()).code(),
            ErrorCode::DonationNotFound
        );
    }

    #[test]
    fn database_errors_become_infrastructure() {
        let err: EntitlementError = DomainError::database("insert income", "boom").into();
        assert!(matches!(err, EntitlementError::Infrastructure(_)));
    }
}
