//! FollowHandler / UnfollowHandler.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, UserFollow};
use crate::domain::foundation::{BlogId, Timestamp, UserId};
use crate::ports::{ContentRepository, EntitlementStore};

#[derive(Debug, Clone, Copy)]
pub struct FollowCommand {
    pub user_id: UserId,
    pub blog_id: BlogId,
}

pub struct FollowHandler {
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn EntitlementStore>,
}

impl FollowHandler {
    pub fn new(content: Arc<dyn ContentRepository>, store: Arc<dyn EntitlementStore>) -> Self {
        Self { content, store }
    }

    pub async fn handle(&self, cmd: FollowCommand) -> Result<(), EntitlementError> {
        if self.content.blog_owner(cmd.blog_id).await?.is_none() {
            return Err(EntitlementError::ValidationFailed {
                field: "blog_id".to_string(),
                message: format!("unknown blog {}", cmd.blog_id),
            });
        }
        self.store
            .follow(&UserFollow {
                user_id: cmd.user_id,
                blog_id: cmd.blog_id,
                created_at: Timestamp::now(),
            })
            .await?;
        tracing::debug!(user_id = %cmd.user_id, blog_id = %cmd.blog_id, "Followed");
        Ok(())
    }
}

pub struct UnfollowHandler {
    store: Arc<dyn EntitlementStore>,
}

impl UnfollowHandler {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    /// Returns `false` if the viewer was not following.
    pub async fn handle(&self, cmd: FollowCommand) -> Result<bool, EntitlementError> {
        let removed = self.store.unfollow(cmd.user_id, cmd.blog_id).await?;
        tracing::debug!(user_id = %cmd.user_id, blog_id = %cmd.blog_id, removed, "Unfollowed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn follow_then_unfollow() {
        let w = World::new();
        let viewer = UserId::new();
        let cmd = FollowCommand {
            user_id: viewer,
            blog_id: w.blog,
        };

        FollowHandler::new(w.db.clone(), w.db.clone()).handle(cmd).await.unwrap();
        assert!(w.is_following(viewer).await);

        let unfollow = UnfollowHandler::new(w.db.clone());
        assert!(unfollow.handle(cmd).await.unwrap());
        assert!(!unfollow.handle(cmd).await.unwrap());
        assert!(!w.is_following(viewer).await);
    }

    #[tokio::test]
    async fn following_unknown_blog_fails() {
        let w = World::new();
        let err = FollowHandler::new(w.db.clone(), w.db.clone())
            .handle(FollowCommand {
                user_id: UserId::new(),
                blog_id: BlogId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EntitlementError::ValidationFailed { .. }));
    }
}
