//! In-memory content, entitlement, and reconciliation storage.
//!
//! One shared state behind a mutex implements all three ports, so the
//! workers see exactly what the grant handlers wrote.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::domain::content::{
    BlogMetrics, CommentTally, Goal, Post, ReactionTally, SubscriptionTier, TierLadder,
};
use crate::domain::entitlement::{
    BlogIncome, Donation, PostPaidAccess, SubscriptionStatus, UserFollow, UserSubscription,
};
use crate::domain::foundation::{
    BlogId, DomainError, DonationId, ErrorCode, GoalId, IncomeId, InvoiceId, PostId,
    SubscriptionId, Timestamp, UserId, UserSubscriptionId, WalletBatchId,
};
use crate::ports::{
    ContentRepository, EntitlementStore, PostPurchase, ReconciliationStore, SubscriptionGrant,
};

#[derive(Default)]
struct State {
    blog_owners: HashMap<BlogId, UserId>,
    tiers: Vec<SubscriptionTier>,
    posts: HashMap<PostId, Post>,
    reactions: HashMap<(PostId, UserId), bool>,
    subscriptions: HashMap<UserSubscriptionId, UserSubscription>,
    follows: HashMap<(UserId, BlogId), UserFollow>,
    paid_access: HashMap<(PostId, UserId), PostPaidAccess>,
    donations: HashMap<DonationId, Donation>,
    incomes: Vec<BlogIncome>,
    goals: HashMap<GoalId, Goal>,
}

impl State {
    fn tier_price(&self, id: SubscriptionId) -> Option<(bool, Decimal)> {
        self.tiers
            .iter()
            .find(|t| t.id == id)
            .map(|t| (t.is_free, t.price_rub.as_decimal()))
    }

    /// Keeps one binding per `(user, tier)`, like the unique key in Postgres.
    fn upsert_subscription(&mut self, subscription: &UserSubscription) {
        let existing = self
            .subscriptions
            .values()
            .find(|s| {
                s.user_id == subscription.user_id
                    && s.subscription_id == subscription.subscription_id
            })
            .map(|s| s.id);
        let mut row = subscription.clone();
        if let Some(id) = existing {
            row.id = id;
        }
        self.subscriptions.insert(row.id, row);
    }

    fn insert_income(&mut self, income: &BlogIncome) -> Result<(), DomainError> {
        let duplicate = income.invoice_id.is_some()
            && self.incomes.iter().any(|i| i.invoice_id == income.invoice_id);
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "income already recorded for invoice",
            ));
        }
        self.incomes.push(income.clone());
        Ok(())
    }
}

/// Shared in-memory store for local runs and tests.
#[derive(Default)]
pub struct InMemoryDatabase {
    state: Mutex<State>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "in-memory store lock poisoned"))
    }

    fn with<T: Default>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        self.lock().map(|mut state| f(&mut state)).unwrap_or_default()
    }

    // === Seeding ===

    pub fn insert_blog(&self, blog_id: BlogId, owner_id: UserId) {
        self.with(|s| {
            s.blog_owners.insert(blog_id, owner_id);
        })
    }

    pub fn insert_tier(&self, tier: SubscriptionTier) {
        self.with(|s| {
            s.tiers.retain(|t| t.id != tier.id);
            s.tiers.push(tier);
        })
    }

    pub fn insert_post(&self, post: Post) {
        self.with(|s| {
            s.posts.insert(post.id, post);
        })
    }

    pub fn insert_donation(&self, donation: Donation) {
        self.with(|s| {
            s.donations.insert(donation.id, donation);
        })
    }

    pub fn insert_goal(&self, goal: Goal) {
        self.with(|s| {
            s.goals.insert(goal.id, goal);
        })
    }

    pub fn insert_subscription(&self, subscription: UserSubscription) {
        self.with(|s| {
            s.subscriptions.insert(subscription.id, subscription);
        })
    }

    pub fn insert_income(&self, income: BlogIncome) {
        self.with(|s| s.incomes.push(income))
    }

    /// Records a like (`true`) or dislike (`false`) from a user.
    pub fn react(&self, post_id: PostId, user_id: UserId, like: bool) {
        self.with(|s| {
            s.reactions.insert((post_id, user_id), like);
        })
    }

    // === Inspection ===

    pub fn post(&self, id: PostId) -> Option<Post> {
        self.with(|s| s.posts.get(&id).cloned())
    }

    pub fn goal(&self, id: GoalId) -> Option<Goal> {
        self.with(|s| s.goals.get(&id).cloned())
    }

    pub fn donation(&self, id: DonationId) -> Option<Donation> {
        self.with(|s| s.donations.get(&id).cloned())
    }

    pub fn subscription(&self, id: UserSubscriptionId) -> Option<UserSubscription> {
        self.with(|s| s.subscriptions.get(&id).cloned())
    }

    pub fn subscriptions(&self) -> Vec<UserSubscription> {
        self.with(|s| s.subscriptions.values().cloned().collect())
    }

    pub fn incomes(&self) -> Vec<BlogIncome> {
        self.with(|s| s.incomes.clone())
    }

    pub fn paid_access_count(&self) -> usize {
        self.with(|s| s.paid_access.len())
    }
}

#[async_trait]
impl ContentRepository for InMemoryDatabase {
    async fn find_post(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        Ok(self.lock()?.posts.get(&id).cloned())
    }

    async fn find_tier(&self, id: SubscriptionId) -> Result<Option<SubscriptionTier>, DomainError> {
        Ok(self.lock()?.tiers.iter().find(|t| t.id == id).cloned())
    }

    async fn tier_ladder(&self, blog_id: BlogId) -> Result<TierLadder, DomainError> {
        let tiers = self
            .lock()?
            .tiers
            .iter()
            .filter(|t| t.blog_id == blog_id)
            .cloned()
            .collect();
        Ok(TierLadder::new(tiers))
    }

    async fn blog_owner(&self, blog_id: BlogId) -> Result<Option<UserId>, DomainError> {
        Ok(self.lock()?.blog_owners.get(&blog_id).copied())
    }

    async fn assign_post_tier(&self, post_id: PostId, tier: SubscriptionId) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| DomainError::new(ErrorCode::PostNotFound, format!("post {}", post_id)))?;
        post.subscription_id = Some(tier);
        Ok(())
    }
}

#[async_trait]
impl EntitlementStore for InMemoryDatabase {
    async fn find_income_by_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<BlogIncome>, DomainError> {
        Ok(self
            .lock()?
            .incomes
            .iter()
            .find(|i| i.invoice_id == Some(invoice_id))
            .cloned())
    }

    async fn find_subscription(
        &self,
        user_id: UserId,
        tier_id: SubscriptionId,
    ) -> Result<Option<UserSubscription>, DomainError> {
        Ok(self
            .lock()?
            .subscriptions
            .values()
            .find(|s| s.user_id == user_id && s.subscription_id == tier_id)
            .cloned())
    }

    async fn list_subscriptions(
        &self,
        user_id: UserId,
        blog_id: BlogId,
    ) -> Result<Vec<UserSubscription>, DomainError> {
        Ok(self
            .lock()?
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id && s.blog_id == blog_id)
            .cloned()
            .collect())
    }

    async fn save_subscription(&self, subscription: &UserSubscription) -> Result<(), DomainError> {
        self.lock()?.upsert_subscription(subscription);
        Ok(())
    }

    async fn record_subscription_grant(&self, grant: &SubscriptionGrant) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.insert_income(&grant.income)?;
        state.follows.insert(
            (grant.follow.user_id, grant.follow.blog_id),
            grant.follow.clone(),
        );
        state.upsert_subscription(&grant.subscription);
        Ok(())
    }

    async fn has_paid_access(&self, post_id: PostId, user_id: UserId) -> Result<bool, DomainError> {
        Ok(self.lock()?.paid_access.contains_key(&(post_id, user_id)))
    }

    async fn record_post_purchase(&self, purchase: &PostPurchase) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.insert_income(&purchase.income)?;
        if let Some(access) = &purchase.access {
            state
                .paid_access
                .entry((access.post_id, access.user_id))
                .or_insert_with(|| access.clone());
        }
        Ok(())
    }

    async fn find_donation(&self, id: DonationId) -> Result<Option<Donation>, DomainError> {
        Ok(self.lock()?.donations.get(&id).cloned())
    }

    async fn record_donation(&self, income: &BlogIncome, donation: &Donation) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.insert_income(income)?;
        state.donations.insert(donation.id, donation.clone());
        Ok(())
    }

    async fn is_following(&self, user_id: UserId, blog_id: BlogId) -> Result<bool, DomainError> {
        Ok(self.lock()?.follows.contains_key(&(user_id, blog_id)))
    }

    async fn follow(&self, follow: &UserFollow) -> Result<(), DomainError> {
        self.lock()?
            .follows
            .insert((follow.user_id, follow.blog_id), follow.clone());
        Ok(())
    }

    async fn unfollow(&self, user_id: UserId, blog_id: BlogId) -> Result<bool, DomainError> {
        Ok(self.lock()?.follows.remove(&(user_id, blog_id)).is_some())
    }
}

#[async_trait]
impl ReconciliationStore for InMemoryDatabase {
    async fn list_post_ids(&self) -> Result<Vec<PostId>, DomainError> {
        Ok(self.lock()?.posts.keys().copied().collect())
    }

    async fn overwrite_comment_counts(&self, tallies: &[CommentTally]) -> Result<u64, DomainError> {
        let mut state = self.lock()?;
        let mut updated = 0;
        for tally in tallies {
            if let Some(post) = state.posts.get_mut(&tally.post_id) {
                post.comments_count = tally.comments;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn reaction_tallies(&self) -> Result<Vec<ReactionTally>, DomainError> {
        let state = self.lock()?;
        let mut tallies: HashMap<PostId, ReactionTally> = HashMap::new();
        for ((post_id, _), like) in &state.reactions {
            let tally = tallies
                .entry(*post_id)
                .or_insert_with(|| ReactionTally::zero(*post_id));
            if *like {
                tally.likes += 1;
            } else {
                tally.dislikes += 1;
            }
        }
        Ok(tallies.into_values().collect())
    }

    async fn overwrite_reaction_counts(&self, tallies: &[ReactionTally]) -> Result<u64, DomainError> {
        let mut state = self.lock()?;
        let mut updated = 0;
        for tally in tallies {
            if let Some(post) = state.posts.get_mut(&tally.post_id) {
                post.likes_count = tally.likes;
                post.dislikes_count = tally.dislikes;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn list_goals(&self) -> Result<Vec<Goal>, DomainError> {
        Ok(self.lock()?.goals.values().cloned().collect())
    }

    async fn blog_metrics(
        &self,
        blog_ids: &[BlogId],
    ) -> Result<HashMap<BlogId, BlogMetrics>, DomainError> {
        let state = self.lock()?;
        let wanted: HashSet<BlogId> = blog_ids.iter().copied().collect();
        let mut metrics: HashMap<BlogId, BlogMetrics> = HashMap::new();

        for (_, blog_id) in state.follows.keys() {
            if wanted.contains(blog_id) {
                metrics.entry(*blog_id).or_default().followers += 1;
            }
        }
        for sub in state.subscriptions.values() {
            if !wanted.contains(&sub.blog_id) || !sub.is_current() {
                continue;
            }
            if let Some((false, price)) = state.tier_price(sub.subscription_id) {
                let m = metrics.entry(sub.blog_id).or_default();
                m.paid_subscribers += 1;
                m.active_subscription_value += price;
            }
        }
        for income in &state.incomes {
            if wanted.contains(&income.blog_id) {
                metrics.entry(income.blog_id).or_default().income_rub += income.amount.as_decimal();
            }
        }
        Ok(metrics)
    }

    async fn overwrite_goal_progress(&self, progress: &[(GoalId, Decimal)]) -> Result<u64, DomainError> {
        let mut state = self.lock()?;
        let mut updated = 0;
        for (id, current) in progress {
            if let Some(goal) = state.goals.get_mut(id) {
                goal.current = *current;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn find_lapsed_subscriptions(
        &self,
        now: Timestamp,
    ) -> Result<Vec<UserSubscription>, DomainError> {
        Ok(self
            .lock()?
            .subscriptions
            .values()
            .filter(|s| s.is_active && s.expires_at.map_or(false, |at| at.is_before(&now)))
            .cloned()
            .collect())
    }

    async fn expire_subscriptions(
        &self,
        ids: &[UserSubscriptionId],
        now: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut state = self.lock()?;
        let mut updated = 0;
        for id in ids {
            if let Some(sub) = state.subscriptions.get_mut(id) {
                sub.status = SubscriptionStatus::Expired;
                sub.is_active = false;
                sub.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn unsent_incomes(&self) -> Result<Vec<BlogIncome>, DomainError> {
        Ok(self
            .lock()?
            .incomes
            .iter()
            .filter(|i| !i.sent_to_user_wallet)
            .cloned()
            .collect())
    }

    async fn claim_wallet_batch(
        &self,
        ids: &[IncomeId],
        batch: WalletBatchId,
    ) -> Result<u64, DomainError> {
        let mut state = self.lock()?;
        let ids: HashSet<&IncomeId> = ids.iter().collect();
        let mut claimed = 0;
        for income in state.incomes.iter_mut() {
            if ids.contains(&income.id) && income.wallet_batch.is_none() && !income.sent_to_user_wallet {
                income.wallet_batch = Some(batch);
                claimed += 1;
            }
        }
        Ok(claimed)
    }

    async fn mark_incomes_sent(&self, ids: &[IncomeId]) -> Result<u64, DomainError> {
        let mut state = self.lock()?;
        let ids: HashSet<&IncomeId> = ids.iter().collect();
        let mut updated = 0;
        for income in state.incomes.iter_mut() {
            if ids.contains(&income.id) && !income.sent_to_user_wallet {
                income.sent_to_user_wallet = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}
