//! GrantPostAccessHandler - Materializes a single-post purchase.

use std::sync::Arc;

use crate::domain::billing::ItemType;
use crate::domain::entitlement::{
    BlogIncome, EntitlementError, GrantOutcome, GrantRequest, Notification, NotificationEvent,
    PostPaidAccess,
};
use crate::domain::foundation::{PostId, Timestamp};
use crate::ports::{ContentRepository, EntitlementStore, NotificationSink, PostPurchase};

use super::{already_granted, blog_owner};

pub struct GrantPostAccessHandler {
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn EntitlementStore>,
    notifications: Arc<dyn NotificationSink>,
}

impl GrantPostAccessHandler {
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

        let post_id = PostId::from_uuid(request.item_id);
        let post = self
            .content
            .find_post(post_id)
            .await?
            .ok_or(EntitlementError::PostNotFound(post_id))?;
        let owner_id = blog_owner(&*self.content, post.blog_id).await?;

        let now = Timestamp::now();
        let access = if self.store.has_paid_access(post.id, request.user_id).await? {
            None
        } else {
            Some(PostPaidAccess {
                post_id: post.id,
                user_id: request.user_id,
                created_at: now,
            })
        };

        let purchase = PostPurchase {
            income: BlogIncome::record(
                post.blog_id,
                owner_id,
                request.user_id,
                request.value,
                request.currency,
                ItemType::Post,
                request.item_id,
                request.invoice_id,
                now,
            ),
            access,
        };

        match self.store.record_post_purchase(&purchase).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => return Ok(GrantOutcome::AlreadyGranted),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(post_id = %post.id, user_id = %request.user_id, "Post access granted");

        self.notifications.push(Notification::new(
            owner_id,
            NotificationEvent::PostSold {
                post_id: post.id,
                buyer_id: request.user_id,
                amount: request.value,
            },
        ));
        self.notifications.push(Notification::new(
            request.user_id,
            NotificationEvent::PostUnlocked { post_id: post.id },
        ));

        Ok(GrantOutcome::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::domain::content::AccessMode;
    use crate::domain::foundation::UserId;
    use crate::ports::EntitlementStore;

    fn handler(w: &World) -> GrantPostAccessHandler {
        GrantPostAccessHandler::new(w.db.clone(), w.db.clone(), w.notifications.clone())
    }

    #[tokio::test]
    async fn records_income_and_access() {
        let w = World::new();
        let post = w.post(AccessMode::PayPerItem, None);
        let buyer = UserId::new();

        let outcome = handler(&w)
            .handle(&grant(post.id.as_uuid(), buyer, "49.90", Some(3)))
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::Granted);
        assert!(w.db.has_paid_access(post.id, buyer).await.unwrap());
        assert_eq!(w.db.incomes().len(), 1);
        assert_eq!(w.db.incomes()[0].source, ItemType::Post);
        assert_eq!(w.notifications.all().len(), 2);
    }

    #[tokio::test]
    async fn second_purchase_keeps_single_access_row() {
        let w = World::new();
        let post = w.post(AccessMode::PayPerItem, None);
        let buyer = UserId::new();
        let h = handler(&w);

        h.handle(&grant(post.id.as_uuid(), buyer, "10", Some(1))).await.unwrap();
        h.handle(&grant(post.id.as_uuid(), buyer, "10", Some(2))).await.unwrap();

        assert_eq!(w.db.paid_access_count(), 1);
        assert_eq!(w.db.incomes().len(), 2);
    }

    #[tokio::test]
    async fn repeated_invoice_is_already_granted() {
        let w = World::new();
        let post = w.post(AccessMode::PayPerItem, None);
        let request = grant(post.id.as_uuid(), UserId::new(), "10", Some(9));
        let h = handler(&w);

        h.handle(&request).await.unwrap();
        assert_eq!(h.handle(&request).await.unwrap(), GrantOutcome::AlreadyGranted);
        assert_eq!(w.db.incomes().len(), 1);
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let w = World::new();
        let err = handler(&w)
            .handle(&grant(&uuid::Uuid::new_v4(), UserId::new(), "10", None))
            .await
            .unwrap_err();
        assert!(matches!(err, EntitlementError::PostNotFound(_)));
    }
}
