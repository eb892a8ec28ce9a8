//! Goal progress reconciliation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::content::{BlogMetrics, Goal};
use crate::domain::foundation::{BlogId, DomainError, GoalId};
use crate::ports::ReconciliationStore;

use super::PeriodicWorker;

/// Recomputes `current` of every goal from fresh blog metrics.
pub struct GoalsWorker {
    store: Arc<dyn ReconciliationStore>,
}

impl GoalsWorker {
    pub fn new(store: Arc<dyn ReconciliationStore>) -> Self {
        Self { store }
    }
}

/// New `current` per goal. Blogs without metrics measure zero.
pub fn goal_progress(goals: &[Goal], metrics: &HashMap<BlogId, BlogMetrics>) -> Vec<(GoalId, Decimal)> {
    let empty = BlogMetrics::default();
    goals
        .iter()
        .map(|goal| {
            let m = metrics.get(&goal.blog_id).unwrap_or(&empty);
            (goal.id, m.measure(goal.goal_type))
        })
        .collect()
}

#[async_trait]
impl PeriodicWorker for GoalsWorker {
    fn name(&self) -> &'static str {
        "goals"
    }

    async fn tick(&self) -> Result<u64, DomainError> {
        let goals = self.store.list_goals().await?;
        if goals.is_empty() {
            return Ok(0);
        }
        let blog_ids: Vec<BlogId> = goals
            .iter()
            .map(|g| g.blog_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let metrics = self.store.blog_metrics(&blog_ids).await?;
        self.store
            .overwrite_goal_progress(&goal_progress(&goals, &metrics))
            .await
    }
}
