//! Content domain module.
//!
//! Posts, blog tiers, goals, and the access decision consulted on every read.
//!
//! # Module Structure
//!
//! - `access_mode` - Per-post read policy
//! - `access_policy` - Pure access decision and lazy tier resolution
//! - `tier` - Subscription tiers and the price-ordered ladder
//! - `post` - Post read model and counter tallies
//! - `goal` - Goals and per-blog metrics
//! - `errors` - AccessError

mod access_mode;
pub mod access_policy;
mod errors;
mod goal;
mod post;
pub(crate) mod tier;

pub use access_mode::AccessMode;
pub use access_policy::{AccessDecision, AccessFacts, DenyReason, GrantReason, RequiredTier};
pub use errors::AccessError;
pub use goal::{BlogMetrics, Goal, GoalType};
pub use post::{CommentTally, Post, ReactionTally};
pub use tier::{SubscriptionTier, TierLadder};
