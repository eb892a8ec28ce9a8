//! In-process [`EntitlementGranter`] over the grant handlers.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entitlement::{GrantOutcome, GrantRequest};
use crate::domain::foundation::DomainError;
use crate::ports::EntitlementGranter;

use super::{ConfirmDonationHandler, GrantPostAccessHandler, GrantSubscriptionHandler};

pub struct LocalEntitlementGranter {
    subscriptions: Arc<GrantSubscriptionHandler>,
    posts: Arc<GrantPostAccessHandler>,
    donations: Arc<ConfirmDonationHandler>,
}

impl LocalEntitlementGranter {
    pub fn new(
        subscriptions: Arc<GrantSubscriptionHandler>,
        posts: Arc<GrantPostAccessHandler>,
        donations: Arc<ConfirmDonationHandler>,
    ) -> Self {
        Self {
            subscriptions,
            posts,
            donations,
        }
    }
}

#[async_trait]
impl EntitlementGranter for LocalEntitlementGranter {
    async fn grant_subscription(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
        Ok(self.subscriptions.handle(request).await?)
    }

    async fn grant_post_access(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
        Ok(self.posts.handle(request).await?)
    }

    async fn confirm_donation(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
        Ok(self.donations.handle(request).await?)
    }
}
