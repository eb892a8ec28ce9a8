//! Post read model used by access resolution and the counter workers.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Amount, BlogId, PostId, SubscriptionId, Timestamp, UserId};

use super::AccessMode;

/// A blog post as seen by the access resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub blog_id: BlogId,
    pub author_id: UserId,
    pub access_mode: AccessMode,
    /// Price for [`AccessMode::PayPerItem`] posts.
    pub price: Option<Amount>,
    /// Minimum tier for [`AccessMode::SubscriptionGated`] posts.
    pub subscription_id: Option<SubscriptionId>,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: Timestamp,
}

impl Post {
    pub fn is_authored_by(&self, viewer: UserId) -> bool {
        self.author_id == viewer
    }
}

/// Recomputed like and dislike totals for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionTally {
    pub post_id: PostId,
    pub likes: i64,
    pub dislikes: i64,
}

impl ReactionTally {
    pub fn zero(post_id: PostId) -> Self {
        Self {
            post_id,
            likes: 0,
            dislikes: 0,
        }
    }
}

/// Live comment count for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentTally {
    pub post_id: PostId,
    pub comments: i64,
}
