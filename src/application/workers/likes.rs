//! Like/dislike count reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::content::ReactionTally;
use crate::domain::foundation::{DomainError, PostId};
use crate::ports::ReconciliationStore;

use super::PeriodicWorker;

/// Recomputes reaction counters from the reaction ledger.
pub struct LikesWorker {
    store: Arc<dyn ReconciliationStore>,
}

impl LikesWorker {
    pub fn new(store: Arc<dyn ReconciliationStore>) -> Self {
        Self { store }
    }
}

/// One tally per post; posts absent from the ledger get zeros.
pub fn merge_tallies(post_ids: &[PostId], ledger: Vec<ReactionTally>) -> Vec<ReactionTally> {
    let mut by_post: HashMap<PostId, ReactionTally> =
        ledger.into_iter().map(|t| (t.post_id, t)).collect();
    post_ids
        .iter()
        .map(|id| by_post.remove(id).unwrap_or_else(|| ReactionTally::zero(*id)))
        .collect()
}

#[async_trait]
impl PeriodicWorker for LikesWorker {
    fn name(&self) -> &'static str {
        "likes"
    }

    async fn tick(&self) -> Result<u64, DomainError> {
        let post_ids = self.store.list_post_ids().await?;
        let ledger = self.store.reaction_tallies().await?;
        let tallies = merge_tallies(&post_ids, ledger);
        if tallies.is_empty() {
            return Ok(0);
        }
        self.store.overwrite_reaction_counts(&tallies).await
    }
}
