//! Comment count reconciliation.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::domain::content::CommentTally;
use crate::domain::foundation::DomainError;
use crate::ports::{CommentCounter, ReconciliationStore};

use super::PeriodicWorker;

const MAX_CONCURRENT_CALLS: usize = 8;

/// Copies live comment counts from the comments service onto posts.
///
/// Counts are fetched for every post before anything is written; one failed
/// call abandons the tick.
pub struct CommentsWorker {
    store: Arc<dyn ReconciliationStore>,
    comments: Arc<dyn CommentCounter>,
}

impl CommentsWorker {
    pub fn new(store: Arc<dyn ReconciliationStore>, comments: Arc<dyn CommentCounter>) -> Self {
        Self { store, comments }
    }
}

#[async_trait]
impl PeriodicWorker for CommentsWorker {
    fn name(&self) -> &'static str {
        "comments"
    }

    async fn tick(&self) -> Result<u64, DomainError> {
        let post_ids = self.store.list_post_ids().await?;
        if post_ids.is_empty() {
            return Ok(0);
        }

        let tallies: Vec<CommentTally> = stream::iter(post_ids)
            .map(|post_id| async move {
                let comments = self.comments.count_for(post_id).await?;
                Ok::<_, DomainError>(CommentTally { post_id, comments })
            })
            .buffer_unordered(MAX_CONCURRENT_CALLS)
            .try_collect()
            .await?;

        self.store.overwrite_comment_counts(&tallies).await
    }
}
