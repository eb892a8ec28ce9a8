//! Periodic reconciliation workers.
//!
//! Each worker recomputes one kind of derived data from its source of truth
//! and overwrites the stored copy. Ticks are safe to repeat.

mod comments;
mod goals;
mod income_forwarding;
mod likes;
mod runner;
mod subscription_expiry;

pub use comments::CommentsWorker;
pub use goals::{goal_progress, GoalsWorker};
pub use income_forwarding::IncomeForwardingWorker;
pub use likes::{merge_tallies, LikesWorker};
pub use runner::{run_worker, spawn_worker, PeriodicWorker};
pub use subscription_expiry::{due_for_expiry, SubscriptionExpiryWorker};
