//! Port to the service that owns entitlements.
//!
//! Each call is idempotent on the callee side when the request carries an
//! `invoice_id`: a repeated grant returns [`GrantOutcome::AlreadyGranted`].

use async_trait::async_trait;

use crate::domain::entitlement::{GrantOutcome, GrantRequest};
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait EntitlementGranter: Send + Sync {
    /// `item_id` is a subscription tier.
    async fn grant_subscription(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError>;

    /// `item_id` is a post.
    async fn grant_post_access(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError>;

    /// `item_id` is a pending donation.
    async fn confirm_donation(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError>;
}
