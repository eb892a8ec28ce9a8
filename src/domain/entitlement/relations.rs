//! Follows and single-post purchases.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BlogId, PostId, Timestamp, UserId};

/// A viewer following a blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFollow {
    pub user_id: UserId,
    pub blog_id: BlogId,
    pub created_at: Timestamp,
}

/// A viewer's right to read one paid post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPaidAccess {
    pub post_id: PostId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}
