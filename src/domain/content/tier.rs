//! Subscription tiers and the tier ladder.
//!
//! A blog's tiers are ordered ascending by price. A higher tier subsumes the
//! content gated behind any lower one, so "may read content gated at tier `i`"
//! means "holds any tier at ladder position `i` or later".

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Amount, BlogId, SubscriptionId};

/// Subscription tier offered by a blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTier {
    pub id: SubscriptionId,
    pub blog_id: BlogId,
    pub title: String,
    pub is_free: bool,
    pub price_rub: Amount,
    /// Soft-delete flag; inactive tiers cannot be bought but keep their rank.
    pub is_active: bool,
    pub cover: Option<String>,
}

impl SubscriptionTier {
    /// True for tiers that must be paid for.
    pub fn is_paid(&self) -> bool {
        !self.is_free
    }
}

/// A blog's tiers sorted ascending by price.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TierLadder {
    tiers: Vec<SubscriptionTier>,
}

impl TierLadder {
    /// Builds the ladder. Tiers with equal prices keep their input order.
    pub fn new(mut tiers: Vec<SubscriptionTier>) -> Self {
        tiers.sort_by(|a, b| a.price_rub.cmp(&b.price_rub));
        Self { tiers }
    }

    /// Tiers in ladder order.
    pub fn tiers(&self) -> &[SubscriptionTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// True if the blog offers at least one free tier.
    pub fn has_free_tier(&self) -> bool {
        self.tiers.iter().any(|t| t.is_free)
    }

    /// True if the blog offers at least one paid tier.
    pub fn has_paid_tier(&self) -> bool {
        self.tiers.iter().any(SubscriptionTier::is_paid)
    }

    /// Cheapest paid tier.
    pub fn first_paid(&self) -> Option<&SubscriptionTier> {
        self.tiers.iter().find(|t| t.is_paid())
    }

    /// Ladder position of a tier.
    pub fn position(&self, id: SubscriptionId) -> Option<usize> {
        self.tiers.iter().position(|t| t.id == id)
    }

    /// Looks a tier up by id.
    pub fn get(&self, id: SubscriptionId) -> Option<&SubscriptionTier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// Tiers that satisfy a gate at `required`: that tier and every later one.
    pub fn satisfying(&self, required: SubscriptionId) -> &[SubscriptionTier] {
        match self.position(required) {
            Some(index) => &self.tiers[index..],
            None => &[],
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn tier(blog_id: BlogId, price: &str, is_free: bool) -> SubscriptionTier {
        SubscriptionTier {
            id: SubscriptionId::new(),
            blog_id,
            title: format!("Tier {}", price),
            is_free,
            price_rub: price.parse().unwrap(),
            is_active: true,
            cover: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::tier;
    use super::*;

    #[test]
    fn sorts_ascending_by_price() {
        let blog = BlogId::new();
        let ladder = TierLadder::new(vec![
            tier(blog, "300", false),
            tier(blog, "0", true),
            tier(blog, "100", false),
        ]);
        let prices: Vec<String> = ladder.tiers().iter().map(|t| t.price_rub.to_string()).collect();
        assert_eq!(prices, vec!["0.00", "100.00", "300.00"]);
    }

    #[test]
    fn first_paid_skips_free_tiers() {
        let blog = BlogId::new();
        let cheap = tier(blog, "100", false);
        let ladder = TierLadder::new(vec![tier(blog, "300", false), tier(blog, "0", true), cheap.clone()]);
        assert_eq!(ladder.first_paid().map(|t| t.id), Some(cheap.id));
    }

    #[test]
    fn satisfying_returns_required_and_higher_tiers() {
        let blog = BlogId::new();
        let free = tier(blog, "0", true);
        let mid = tier(blog, "100", false);
        let top = tier(blog, "300", false);
        let ladder = TierLadder::new(vec![free.clone(), mid.clone(), top.clone()]);

        let ids: Vec<SubscriptionId> = ladder.satisfying(mid.id).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![mid.id, top.id]);
        assert!(ladder.satisfying(SubscriptionId::new()).is_empty());
    }

    #[test]
    fn free_and_paid_detection() {
        let blog = BlogId::new();
        assert!(!TierLadder::default().has_free_tier());
        assert!(!TierLadder::default().has_paid_tier());

        let only_free = TierLadder::new(vec![tier(blog, "0", true)]);
        assert!(only_free.has_free_tier());
        assert!(!only_free.has_paid_tier());
    }
}
