//! ConfirmDonationHandler - Settles a pending donation.

use std::sync::Arc;

use crate::domain::billing::ItemType;
use crate::domain::entitlement::{
    BlogIncome, EntitlementError, GrantOutcome, GrantRequest, Notification, NotificationEvent,
};
use crate::domain::foundation::{DonationId, Timestamp};
use crate::ports::{ContentRepository, EntitlementStore, NotificationSink};

use super::{already_granted, blog_owner};

pub struct ConfirmDonationHandler {
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn EntitlementStore>,
    notifications: Arc<dyn NotificationSink>,
}

impl ConfirmDonationHandler {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        store: Arc<dyn EntitlementStore>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            content,
            store,
            notifications,
        }
    }

    pub async fn handle(&self, request: &GrantRequest) -> Result<GrantOutcome, EntitlementError> {
        if already_granted(&*self.store, request).await? {
            return Ok(GrantOutcome::AlreadyGranted);
        }

        let donation_id = DonationId::from_uuid(request.item_id);
        let mut donation = self
            .store
            .find_donation(donation_id)
            .await?
            .ok_or(EntitlementError::DonationNotFound(donation_id))?;

        if !donation.confirm() {
            tracing::debug!(%donation_id, "Donation already confirmed");
            return Ok(GrantOutcome::AlreadyGranted);
        }
        let owner_id = blog_owner(&*self.content, donation.blog_id).await?;

        let income = BlogIncome::record(
            donation.blog_id,
            owner_id,
            request.user_id,
            request.value,
            request.currency,
            ItemType::Donation,
            request.item_id,
            request.invoice_id,
            Timestamp::now(),
        );

        match self.store.record_donation(&income, &donation).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => return Ok(GrantOutcome::AlreadyGranted),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            %donation_id,
            blog_id = %donation.blog_id,
            amount = %request.value,
            "Donation confirmed"
        );

        self.notifications.push(Notification::new(
            owner_id,
            NotificationEvent::DonationReceived {
                blog_id: donation.blog_id,
                donor_id: request.user_id,
                amount: request.value,
            },
        ));
        self.notifications.push(Notification::new(
            request.user_id,
            NotificationEvent::DonationSent {
                blog_id: donation.blog_id,
                amount: request.value,
            },
        ));

        Ok(GrantOutcome::Granted)
    }
}
